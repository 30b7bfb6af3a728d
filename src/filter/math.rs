//! Byte arithmetic shared by all unfiltering kernels.

/// Sum of two bytes, wrapping modulo 256 as required by the PNG filters.
#[inline(always)]
pub(crate) fn sum(a: u8, b: u8) -> u8 {
    a.wrapping_add(b)
}

/// Truncating average of `left` and `up`.
///
/// Note that SIMD "average" instructions (`PAVGB` and friends) round up instead, which is not
/// what PNG asks for. This uses the carry-less identity so it never needs a wider type.
#[inline(always)]
pub(crate) fn avg(a: u8, b: u8) -> u8 {
    (a & b) + ((a ^ b) >> 1)
}

/// Unsigned division by three for `x` in `0..=255`, as a multiply and shift.
///
/// `0xAB / 512` is close enough to `1/3` to be exact on the whole input range. On vector units
/// the same constant shifted left by seven turns into a single multiply-high of 16-bit lanes.
#[inline(always)]
pub(crate) fn udiv3(x: i16) -> i16 {
    ((x as i32 * 0xAB) >> 9) as i16
}

#[inline(always)]
pub(crate) fn abs(x: i16) -> i16 {
    if x >= 0 {
        x
    } else {
        -x
    }
}
