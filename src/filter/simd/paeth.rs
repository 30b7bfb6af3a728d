use super::vector::{U8x16, LANES};
use super::{prologue_len, rounds, MIN_VECTOR_RUN};
use crate::filter::math::sum;
use crate::filter::paeth::filter_paeth_minmax;

// Paeth filter pixels:
// C B D
// A X

#[inline(always)]
fn unfilter_scalar<const BPP: usize>(previous: &[u8], current: &mut [u8], from: usize, to: usize) {
    for i in from..to {
        let pred = filter_paeth_minmax(current[i - BPP], previous[i], previous[i - BPP]);
        current[i] = sum(current[i], pred);
    }
}

pub(super) fn unfilter<const BPP: usize>(previous: &[u8], current: &mut [u8]) {
    let len = current.len().min(previous.len());

    if BPP == 1 {
        return unfilter_1bpp(previous, current, len);
    }

    // For the first pixel `a` and `c` are zero, which predicts `b`.
    for i in 0..BPP.min(len) {
        current[i] = sum(current[i], previous[i]);
    }

    let mut x = BPP.min(len);

    if BPP >= 3 && len - x >= MIN_VECTOR_RUN {
        let head = prologue_len(&current[x..]);
        unfilter_scalar::<BPP>(previous, current, x, x + head);
        x += head;

        let mut a = U8x16::from_prefix(&current[x - BPP..x]);
        let mut c = U8x16::from_prefix(&previous[x - BPP..x]);
        while len - x >= LANES {
            let filtered = U8x16::from_slice(&current[x..]);
            let b = U8x16::from_slice(&previous[x..]);
            let up_left = b.shift_elements_right(BPP) | c;

            let mut out = filtered;
            for _ in 0..rounds(BPP) {
                let left = out.shift_elements_right(BPP) | a;
                out = filtered + U8x16::paeth(left, b, up_left);
            }

            out.copy_to_slice(&mut current[x..]);
            a = out.last_pixel(BPP);
            c = b.last_pixel(BPP);
            x += LANES;
        }
    }

    unfilter_scalar::<BPP>(previous, current, x, len);
}

/// `Paeth` at stride one. The left and upper-left bytes are carried in registers instead of
/// being read back.
fn unfilter_1bpp(previous: &[u8], current: &mut [u8], len: usize) {
    let mut a = 0;
    let mut c = 0;
    for (x, &b) in current[..len].iter_mut().zip(previous) {
        a = sum(*x, filter_paeth_minmax(a, b, c));
        *x = a;
        c = b;
    }
}
