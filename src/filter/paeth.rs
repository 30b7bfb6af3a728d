use super::math::{abs, udiv3};

// Paeth filter pixels:
// C B D
// A X

/// The Paeth predictor as written in the PNG specification.
///
/// `a` is the byte to the left, `b` the byte above and `c` the byte above-left. Ties are
/// broken in the order `a`, `b`, `c`.
pub(crate) fn filter_paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = abs(p - i16::from(a));
    let pb = abs(p - i16::from(b));
    let pc = abs(p - i16::from(c));

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Branch-free Paeth predictor that only needs the minimum and maximum of `a` and `b`.
///
/// Relies on `Paeth(a, b, c) == Paeth(b, a, c)`. With `lo = min(a, b)`, `hi = max(a, b)` and
/// `d = (hi - lo) / 3` the prediction is:
///
/// ```text
///     c <= lo + d  =>  hi
///     c >= hi - d  =>  lo
///     otherwise    =>  c
/// ```
///
/// Both comparisons are turned into sign masks: after subtracting `c` from `lo` and `hi`, the
/// sign of `d + lo` unmasks `hi` and the sign of `d - hi` unmasks `lo`. At most one of them is
/// kept unless `lo == hi`, where both give the same value. The vector kernels evaluate exactly
/// this expression on 16-bit lanes.
#[inline(always)]
pub(crate) fn filter_paeth_minmax(a: u8, b: u8, c: u8) -> u8 {
    let lo = i16::from(a.min(b));
    let hi = i16::from(a.max(b));
    let d = udiv3(hi - lo);
    let c = i16::from(c);

    let lo = lo - c;
    let hi = hi - c;

    (c + (hi & !((d + lo) >> 15)) + (lo & !((d - hi) >> 15))) as u8
}
