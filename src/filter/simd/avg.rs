use super::vector::{U8x16, LANES};
use super::{prologue_len, rounds, MIN_VECTOR_RUN};
use crate::filter::math::{avg, sum};

#[inline(always)]
fn unfilter_scalar<const BPP: usize>(previous: &[u8], current: &mut [u8], from: usize, to: usize) {
    for i in from..to {
        current[i] = sum(current[i], avg(current[i - BPP], previous[i]));
    }
}

pub(super) fn unfilter<const BPP: usize>(previous: &[u8], current: &mut [u8]) {
    let len = current.len().min(previous.len());

    // The first pixel only has the byte above.
    for i in 0..BPP.min(len) {
        current[i] = sum(current[i], previous[i] >> 1);
    }

    if BPP == 1 {
        return unfilter_1bpp(previous, current, len);
    }

    let mut x = BPP.min(len);

    if BPP >= 4 && len - x >= MIN_VECTOR_RUN {
        let head = prologue_len(&current[x..]);
        unfilter_scalar::<BPP>(previous, current, x, x + head);
        x += head;

        let mut left = U8x16::from_prefix(&current[x - BPP..x]);
        while len - x >= LANES {
            let filtered = U8x16::from_slice(&current[x..]);
            let up = U8x16::from_slice(&previous[x..]);

            // Every round resolves one more pixel of the block.
            let mut out = filtered;
            for _ in 0..rounds(BPP) {
                out = filtered + (out.shift_elements_right(BPP) | left).avg(up);
            }

            out.copy_to_slice(&mut current[x..]);
            left = out.last_pixel(BPP);
            x += LANES;
        }
    }

    unfilter_scalar::<BPP>(previous, current, x, len);
}

/// `Avg` at stride one, eight bytes per step.
///
/// `2 * filtered + up` is computed for a whole step up front. Adding the left byte and halving
/// then gives `filtered + (left + up) / 2` without any further rounding step.
fn unfilter_1bpp(previous: &[u8], current: &mut [u8], len: usize) {
    if len == 0 {
        return;
    }

    let mut left = u16::from(current[0]);
    let mut x = 1;

    while len - x >= 8 {
        let mut partial = [0u16; 8];
        for (i, p) in partial.iter_mut().enumerate() {
            *p = (u16::from(current[x + i]) << 1) + u16::from(previous[x + i]);
        }
        for (i, p) in partial.into_iter().enumerate() {
            left = ((left + p) >> 1) & 0xFF;
            current[x + i] = left as u8;
        }
        x += 8;
    }

    unfilter_scalar::<1>(previous, current, x, len);
}
