use super::vector::{U8x16, LANES};
use super::{prologue_len, MIN_VECTOR_RUN};
use crate::filter::math::sum;

/// Prefix sum of the lanes at stride `BPP`: lane `i` gains lanes `i - BPP`, `i - 2 * BPP`, ...
#[inline(always)]
fn scan<const BPP: usize>(mut v: U8x16) -> U8x16 {
    let mut shift = BPP;
    while shift < LANES {
        v = v + v.shift_elements_right(shift);
        shift *= 2;
    }
    v
}

#[inline(always)]
fn unfilter_scalar<const BPP: usize>(current: &mut [u8], from: usize, to: usize) {
    for i in from..to {
        current[i] = sum(current[i], current[i - BPP]);
    }
}

pub(super) fn unfilter<const BPP: usize>(current: &mut [u8]) {
    let len = current.len();
    // The first pixel has nothing to its left.
    let mut x = BPP.min(len);

    if len - x >= MIN_VECTOR_RUN {
        let head = prologue_len(&current[x..]);
        unfilter_scalar::<BPP>(current, x, x + head);
        x += head;

        let mut carry = U8x16::from_prefix(&current[x - BPP..x]);

        // Four blocks are scanned independently, then the carry is rippled through them.
        while len - x >= 4 * LANES {
            let mut blocks = [
                scan::<BPP>(U8x16::from_slice(&current[x..])),
                scan::<BPP>(U8x16::from_slice(&current[x + LANES..])),
                scan::<BPP>(U8x16::from_slice(&current[x + 2 * LANES..])),
                scan::<BPP>(U8x16::from_slice(&current[x + 3 * LANES..])),
            ];
            for (i, block) in blocks.iter_mut().enumerate() {
                *block = *block + carry.broadcast_pixel(BPP);
                carry = block.last_pixel(BPP);
                block.copy_to_slice(&mut current[x + i * LANES..]);
            }
            x += 4 * LANES;
        }

        while len - x >= LANES {
            let block = scan::<BPP>(U8x16::from_slice(&current[x..]) + carry);
            block.copy_to_slice(&mut current[x..]);
            carry = block.last_pixel(BPP);
            x += LANES;
        }
    }

    unfilter_scalar::<BPP>(current, x, len);
}
