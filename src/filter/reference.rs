//! Byte at a time unfiltering, written for clarity rather than speed.
//!
//! Every byte is addressed by its absolute index into the buffer, the stride is a runtime
//! value and the row above is read straight out of the buffer, so this shares no code with the
//! faster kernels apart from the predictors. The other kernels are tested against it.

use super::math::{avg, sum};
use super::paeth::filter_paeth;
use super::FilterType;
use crate::common::ScanlineLayout;

pub(crate) fn unfilter_image(buffer: &mut [u8], layout: &ScanlineLayout) {
    let bpp = layout.bpp().into_usize();
    let bpl = layout.bytes_per_line();
    let len = layout.row_len();

    for y in 0..layout.height() {
        let tag = layout.row_range(y).start;
        // First pixel byte of this row, and of the one above.
        let p = tag + 1;
        let u = p.wrapping_sub(bpl);

        // The first row has nothing above it, which reads as zeros.
        let up = |buffer: &[u8], x: usize| if y == 0 { 0 } else { buffer[u + x] };

        match FilterType::from_u8(buffer[tag]) {
            Some(FilterType::NoFilter) | None => {}
            Some(FilterType::Sub) => {
                for x in bpp..len {
                    buffer[p + x] = sum(buffer[p + x], buffer[p + x - bpp]);
                }
            }
            Some(FilterType::Up) => {
                for x in 0..len {
                    buffer[p + x] = sum(buffer[p + x], up(buffer, x));
                }
            }
            Some(FilterType::Avg) => {
                for x in 0..len {
                    let left = if x >= bpp { buffer[p + x - bpp] } else { 0 };
                    buffer[p + x] = sum(buffer[p + x], avg(left, up(buffer, x)));
                }
            }
            Some(FilterType::Paeth) => {
                for x in 0..len {
                    let (left, up_left) = if x >= bpp {
                        (buffer[p + x - bpp], up(buffer, x - bpp))
                    } else {
                        (0, 0)
                    };
                    let pred = filter_paeth(left, up(buffer, x), up_left);
                    buffer[p + x] = sum(buffer[p + x], pred);
                }
            }
        }
    }
}
