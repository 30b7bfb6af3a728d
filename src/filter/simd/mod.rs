//! Unfiltering on 16 byte vectors.
//!
//! Each filter splits a row into a scalar prologue that brings the destination up to a 16 byte
//! boundary, a vector body and a scalar epilogue. `Up` has no dependency between bytes and is
//! vectorized for every stride. `Sub` turns into a prefix sum. `Avg` and `Paeth` depend on the
//! byte `bpp` positions to the left, so a block of 16 output bytes takes `ceil(16 / bpp)`
//! dependent rounds; for the narrow strides that does not pay off and they stay scalar.

use super::{dispatch_bpp, scalar, FilterType, RowUnfilter};
use crate::common::ScanlineLayout;

mod avg;
mod paeth;
mod sub;
mod up;
mod vector;

use self::vector::LANES;

/// Runs shorter than this are not worth the alignment prologue and stay scalar.
const MIN_VECTOR_RUN: usize = 32;

/// Number of dependent rounds needed to resolve a block of `LANES` bytes at stride `bpp`.
const fn rounds(bpp: usize) -> usize {
    (LANES + bpp - 1) / bpp
}

/// How many leading bytes of `run` to handle one at a time so that the remainder starts on a
/// vector boundary.
#[inline(always)]
fn prologue_len(run: &[u8]) -> usize {
    run.as_ptr().align_offset(LANES).min(LANES - 1)
}

pub(crate) struct Simd<const BPP: usize>;

impl<const BPP: usize> RowUnfilter for Simd<BPP> {
    fn unfilter_row(&self, filter: FilterType, previous: &[u8], current: &mut [u8]) {
        use self::FilterType::*;

        let filter = if previous.is_empty() {
            filter.for_first_row()
        } else {
            filter
        };

        match filter {
            NoFilter => {}
            Sub => sub::unfilter::<BPP>(current),
            Up => up::unfilter(previous, current),
            Avg if previous.is_empty() => scalar::avg_first_row::<BPP>(current),
            Avg => avg::unfilter::<BPP>(previous, current),
            Paeth => paeth::unfilter::<BPP>(previous, current),
        }
    }
}

pub(crate) fn unfilter_image(buffer: &mut [u8], layout: &ScanlineLayout) {
    dispatch_bpp!(Simd, buffer, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BytesPerPixel;
    use crate::filter::reference;
    use rand::{Rng, SeedableRng};

    /// Unfilters a single row pair with the vector kernel and the scalar one, placing the
    /// current row at `offset` bytes into its allocation so every prologue length is covered.
    fn check_row<const BPP: usize>(filter: FilterType, width: usize, offset: usize, seed: u64) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let len = width * BPP;
        let previous: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let mut storage: Vec<u8> = (0..len + LANES).map(|_| rng.gen()).collect();
        let current = &mut storage[offset..offset + len];
        let mut expected = current.to_vec();

        scalar::unfilter::<BPP>(filter, &previous, &mut expected);
        Simd::<BPP>.unfilter_row(filter, &previous, current);
        assert_eq!(
            expected, current,
            "{:?} bpp {} width {} offset {}",
            filter, BPP, width, offset
        );
    }

    fn check_rows<const BPP: usize>() {
        let widths = (1..48).chain([64, 97, 128, 301]);
        for filter in FilterType::ALL {
            for width in widths.clone() {
                for offset in 0..LANES {
                    check_row::<BPP>(filter, width, offset, (width * LANES + offset) as u64);
                }
            }
        }
    }

    #[test]
    fn rows_match_scalar() {
        check_rows::<1>();
        check_rows::<2>();
        check_rows::<3>();
        check_rows::<4>();
        check_rows::<6>();
        check_rows::<8>();
    }

    #[test]
    fn image_matches_reference() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for bpp in BytesPerPixel::ALL {
            for width in [1, 5, 16, 40, 129] {
                let layout = ScanlineLayout::new(width, 12, bpp);
                let mut expected: Vec<u8> = (0..layout.buffer_len()).map(|_| rng.gen()).collect();
                for y in 0..layout.height() {
                    expected[layout.row_range(y).start] = rng.gen_range(0..5);
                }
                let mut actual = expected.clone();

                reference::unfilter_image(&mut expected, &layout);
                unfilter_image(&mut actual, &layout);
                assert_eq!(expected, actual, "{}x12 with {:?}", width, bpp);
            }
        }
    }

    #[test]
    fn block_rounds() {
        assert_eq!(rounds(1), 16);
        assert_eq!(rounds(3), 6);
        assert_eq!(rounds(4), 4);
        assert_eq!(rounds(6), 3);
        assert_eq!(rounds(8), 2);
    }
}
