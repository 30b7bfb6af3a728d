use super::prologue_len;
use super::vector::{U8x16, LANES};
use crate::filter::math::sum;

/// `Up` has no dependency between bytes of a row, so it starts paying off earlier.
const MIN_UP_RUN: usize = 24;

#[inline(always)]
fn unfilter_scalar(previous: &[u8], current: &mut [u8], from: usize, to: usize) {
    for i in from..to {
        current[i] = sum(current[i], previous[i]);
    }
}

#[inline(always)]
fn unfilter_block(previous: &[u8], current: &mut [u8], x: usize) {
    let v = U8x16::from_slice(&current[x..]) + U8x16::from_slice(&previous[x..]);
    v.copy_to_slice(&mut current[x..]);
}

pub(super) fn unfilter(previous: &[u8], current: &mut [u8]) {
    let len = current.len().min(previous.len());
    let mut x = 0;

    if len >= MIN_UP_RUN {
        x = prologue_len(current);
        unfilter_scalar(previous, current, 0, x);

        while len - x >= 4 * LANES {
            unfilter_block(previous, current, x);
            unfilter_block(previous, current, x + LANES);
            unfilter_block(previous, current, x + 2 * LANES);
            unfilter_block(previous, current, x + 3 * LANES);
            x += 4 * LANES;
        }

        while len - x >= LANES {
            unfilter_block(previous, current, x);
            x += LANES;
        }
    }

    unfilter_scalar(previous, current, x, len);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_every_length() {
        for len in 0..200 {
            let previous = vec![200u8; len];
            let mut current: Vec<u8> = (0..len).map(|i| i as u8).collect();
            unfilter(&previous, &mut current);
            let expected: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_add(200)).collect();
            assert_eq!(current, expected, "length {}", len);
        }
    }
}
