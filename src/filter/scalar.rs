//! Scalar unfiltering, instantiated once per stride.
//!
//! With `BPP` known at compile time the per-pixel state fits in `[u8; BPP]` arrays and the
//! compiler is free to keep it in registers and unroll the inner loops.

use super::paeth::filter_paeth;
use super::{dispatch_bpp, FilterType, RowUnfilter};
use crate::common::ScanlineLayout;

pub(crate) struct Scalar<const BPP: usize>;

impl<const BPP: usize> RowUnfilter for Scalar<BPP> {
    fn unfilter_row(&self, filter: FilterType, previous: &[u8], current: &mut [u8]) {
        unfilter::<BPP>(filter, previous, current)
    }
}

pub(crate) fn unfilter_image(buffer: &mut [u8], layout: &ScanlineLayout) {
    dispatch_bpp!(Scalar, buffer, layout)
}

pub(crate) fn unfilter<const BPP: usize>(
    mut filter: FilterType,
    previous: &[u8],
    current: &mut [u8],
) {
    use self::FilterType::*;

    // If the previous row is empty, then treat it as if it were filled with zeros.
    if previous.is_empty() {
        filter = filter.for_first_row();
    }

    match filter {
        NoFilter => {}
        Sub => sub::<BPP>(current),
        Up => up(previous, current),
        Avg if previous.is_empty() => avg_first_row::<BPP>(current),
        Avg => avg::<BPP>(previous, current),
        Paeth => paeth::<BPP>(previous, current),
    }
}

pub(crate) fn sub<const BPP: usize>(current: &mut [u8]) {
    let mut prev = [0u8; BPP];
    for chunk in current.chunks_exact_mut(BPP) {
        for i in 0..BPP {
            chunk[i] = chunk[i].wrapping_add(prev[i]);
        }
        prev.copy_from_slice(chunk);
    }
}

pub(crate) fn up(previous: &[u8], current: &mut [u8]) {
    for (curr, &above) in current.iter_mut().zip(previous) {
        *curr = curr.wrapping_add(above);
    }
}

/// `Avg` without a row above: every byte gains half of its left neighbor.
pub(crate) fn avg_first_row<const BPP: usize>(current: &mut [u8]) {
    let mut prev = [0u8; BPP];
    for chunk in current.chunks_exact_mut(BPP) {
        for i in 0..BPP {
            chunk[i] = chunk[i].wrapping_add(prev[i] / 2);
        }
        prev.copy_from_slice(chunk);
    }
}

pub(crate) fn avg<const BPP: usize>(previous: &[u8], current: &mut [u8]) {
    let mut lprev = [0u8; BPP];
    for (chunk, above) in current
        .chunks_exact_mut(BPP)
        .zip(previous.chunks_exact(BPP))
    {
        for i in 0..BPP {
            chunk[i] = chunk[i].wrapping_add(((above[i] as u16 + lprev[i] as u16) / 2) as u8);
        }
        lprev.copy_from_slice(chunk);
    }
}

pub(crate) fn paeth<const BPP: usize>(previous: &[u8], current: &mut [u8]) {
    // Paeth filter pixels:
    // C B D
    // A X
    let mut a_bpp = [0u8; BPP];
    let mut c_bpp = [0u8; BPP];
    for (chunk, b_bpp) in current
        .chunks_exact_mut(BPP)
        .zip(previous.chunks_exact(BPP))
    {
        for i in 0..BPP {
            chunk[i] = chunk[i].wrapping_add(filter_paeth(a_bpp[i], b_bpp[i], c_bpp[i]));
        }
        a_bpp.copy_from_slice(chunk);
        c_bpp.copy_from_slice(b_bpp);
    }
}
