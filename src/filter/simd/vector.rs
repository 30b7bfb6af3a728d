//! A 16 lane byte vector built on plain arrays.
//!
//! Every operation is a lane-wise loop over a fixed size array, which LLVM lowers to single
//! SSE2 / NEON instructions on targets that have them. The shifts follow the naming of
//! `core::simd`: `shift_elements_right` moves lanes towards higher indices, like `_mm_slli_si128`.

use core::array;
use core::ops::{Add, BitOr};

use super::super::math;

pub(crate) const LANES: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct U8x16([u8; LANES]);

impl U8x16 {
    #[cfg(test)]
    pub(crate) fn splat(value: u8) -> Self {
        Self([value; LANES])
    }

    #[cfg(test)]
    pub(crate) fn from_array(lanes: [u8; LANES]) -> Self {
        Self(lanes)
    }

    #[cfg(test)]
    pub(crate) fn to_array(self) -> [u8; LANES] {
        self.0
    }

    /// Loads the first 16 bytes of `src`.
    #[inline(always)]
    pub(crate) fn from_slice(src: &[u8]) -> Self {
        let mut lanes = [0; LANES];
        lanes.copy_from_slice(&src[..LANES]);
        Self(lanes)
    }

    /// Loads up to 16 bytes of `src` into the low lanes, zeroing the rest.
    #[inline(always)]
    pub(crate) fn from_prefix(src: &[u8]) -> Self {
        let mut lanes = [0; LANES];
        lanes[..src.len()].copy_from_slice(src);
        Self(lanes)
    }

    #[inline(always)]
    pub(crate) fn copy_to_slice(self, dst: &mut [u8]) {
        dst[..LANES].copy_from_slice(&self.0);
    }

    /// Lane-wise truncating average.
    #[inline(always)]
    pub(crate) fn avg(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| math::avg(self.0[i], rhs.0[i])))
    }

    /// Moves every lane `n` places towards the end, shifting in zeros.
    #[inline(always)]
    pub(crate) fn shift_elements_right(self, n: usize) -> Self {
        Self(array::from_fn(|i| if i >= n { self.0[i - n] } else { 0 }))
    }

    /// Moves every lane `n` places towards the start, shifting in zeros.
    #[inline(always)]
    pub(crate) fn shift_elements_left(self, n: usize) -> Self {
        Self(array::from_fn(|i| {
            if i + n < LANES {
                self.0[i + n]
            } else {
                0
            }
        }))
    }

    /// The last `bpp` lanes, moved to the front. This is the pixel to the left of the next
    /// block.
    #[inline(always)]
    pub(crate) fn last_pixel(self, bpp: usize) -> Self {
        self.shift_elements_left(LANES - bpp)
    }

    /// Repeats the pixel held in lanes `0..bpp` over the whole vector.
    #[inline(always)]
    pub(crate) fn broadcast_pixel(self, bpp: usize) -> Self {
        Self(array::from_fn(|i| self.0[i % bpp]))
    }

    /// Lane-wise Paeth predictor of `a` (left), `b` (up) and `c` (up-left).
    ///
    /// Same formulation as [`filter_paeth_minmax`](super::super::paeth::filter_paeth_minmax),
    /// evaluated on 16-bit lanes.
    #[inline(always)]
    pub(crate) fn paeth(a: Self, b: Self, c: Self) -> Self {
        let (a, b, c) = (I16x16::widen(a), I16x16::widen(b), I16x16::widen(c));

        let lo = a.min(b);
        let hi = a.max(b);
        let d = (hi - lo).div3();
        let lo = lo - c;
        let hi = hi - c;

        let pred = c + hi.and_not((d + lo).sign_mask()) + lo.and_not((d - hi).sign_mask());
        pred.narrow()
    }
}

impl Add for U8x16 {
    type Output = Self;

    /// Lane-wise wrapping add.
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i].wrapping_add(rhs.0[i])))
    }
}

impl BitOr for U8x16 {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] | rhs.0[i]))
    }
}

/// Widened lanes for the Paeth predictor. Values stay within `-255..=510`.
#[derive(Clone, Copy)]
struct I16x16([i16; LANES]);

macro_rules! lanewise {
    ($name:ident, |$a:ident, $b:ident| $body:expr) => {
        #[inline(always)]
        fn $name(self, rhs: Self) -> Self {
            Self(array::from_fn(|i| {
                let ($a, $b) = (self.0[i], rhs.0[i]);
                $body
            }))
        }
    };
}

impl I16x16 {
    #[inline(always)]
    fn widen(v: U8x16) -> Self {
        Self(array::from_fn(|i| i16::from(v.0[i])))
    }

    /// Keeps the low byte of every lane.
    #[inline(always)]
    fn narrow(self) -> U8x16 {
        U8x16(array::from_fn(|i| self.0[i] as u8))
    }

    lanewise!(min, |a, b| a.min(b));
    lanewise!(max, |a, b| a.max(b));
    lanewise!(and_not, |a, mask| a & !mask);

    /// `x / 3` for lanes in `0..=255`, as a 16-bit multiply-high.
    #[inline(always)]
    fn div3(self) -> Self {
        Self(array::from_fn(|i| {
            ((u32::from(self.0[i] as u16) * (0xAB << 7)) >> 16) as i16
        }))
    }

    /// All ones for negative lanes, zero otherwise.
    #[inline(always)]
    fn sign_mask(self) -> Self {
        Self(array::from_fn(|i| self.0[i] >> 15))
    }
}

impl Add for I16x16 {
    type Output = Self;

    lanewise!(add, |a, b| a.wrapping_add(b));
}

impl core::ops::Sub for I16x16 {
    type Output = Self;

    lanewise!(sub, |a, b| a.wrapping_sub(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::paeth::filter_paeth;

    fn iota() -> U8x16 {
        U8x16::from_array(array::from_fn(|i| i as u8 + 1))
    }

    #[test]
    fn shifts() {
        let v = iota();
        assert_eq!(
            v.shift_elements_right(3).to_array(),
            [0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]
        );
        assert_eq!(
            v.shift_elements_left(3).to_array(),
            [4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 0, 0, 0]
        );
        assert_eq!(v.shift_elements_right(0), v);
        assert_eq!(v.shift_elements_left(LANES), U8x16::default());
    }

    #[test]
    fn pixel_carry() {
        let v = iota();
        assert_eq!(
            v.last_pixel(4).to_array(),
            [13, 14, 15, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            v.last_pixel(3).broadcast_pixel(3).to_array(),
            [14, 15, 16, 14, 15, 16, 14, 15, 16, 14, 15, 16, 14, 15, 16, 14]
        );
    }

    #[test]
    fn add_wraps_and_avg_truncates() {
        let a = U8x16::splat(200);
        let b = U8x16::splat(101);
        assert_eq!(a + b, U8x16::splat(45));
        assert_eq!(a.avg(b), U8x16::splat(150));
        assert_eq!(U8x16::splat(0xF0) | U8x16::splat(0x0F), U8x16::splat(0xFF));
    }

    #[test]
    fn prefix_load() {
        let v = U8x16::from_prefix(&[7, 8, 9]);
        assert_eq!(v.to_array()[..4], [7, 8, 9, 0]);
    }

    #[test]
    fn paeth_matches_scalar() {
        // Sweep `c` across the lanes so every (a, b) pair sees all 256 values of `c`.
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                for c_base in (0..=255u8).step_by(LANES) {
                    let c = U8x16::from_array(array::from_fn(|i| c_base + i as u8));
                    let pred = U8x16::paeth(U8x16::splat(a), U8x16::splat(b), c).to_array();
                    for (i, &p) in pred.iter().enumerate() {
                        assert_eq!(p, filter_paeth(a, b, c_base + i as u8));
                    }
                }
            }
        }
    }
}
