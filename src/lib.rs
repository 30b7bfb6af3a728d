//! # PNG scanline unfiltering
//! PNG encoders predict every byte of a scanline from its neighbors and only store the
//! difference. This crate undoes that step in place, on a buffer of filtered scanlines as it
//! comes out of the inflated `IDAT` stream of a non-interlaced image (or of one Adam7 pass).
//!
//! Each scanline is a filter type byte followed by `width * bpp` pixel bytes. The filter type
//! bytes are left as they are.
//!
//! ## Usage
//! ```
//! // Two lines of a two pixel wide grayscale image, `Sub` followed by `Up`.
//! let mut buffer = vec![1, 10, 5, 2, 1, 1];
//! png_defilter::reverse_filters(&mut buffer, 2, 1, 3)?;
//! assert_eq!(buffer, [1, 10, 15, 2, 11, 16]);
//! # Ok::<(), png_defilter::UnfilterError>(())
//! ```
//!
//! ## Kernels
//! [`reverse_filters`] always uses the vectorized kernel. The others are selected through
//! [`Kernel`], which is mostly useful for testing and benchmarking since all of them produce
//! identical output:
//! ```
//! use png_defilter::{unfilter_image, BytesPerPixel, Kernel, ScanlineLayout};
//!
//! let layout = ScanlineLayout::new(2, 1, BytesPerPixel::Two);
//! let mut buffer = vec![4, 1, 2, 3, 4];
//! unfilter_image(Kernel::Reference, &mut buffer, &layout)?;
//! assert_eq!(buffer, [4, 1, 2, 4, 6]);
//! # Ok::<(), png_defilter::UnfilterError>(())
//! ```

#![forbid(unsafe_code)]

mod common;
mod error;
mod filter;
pub mod harness;

pub use crate::common::{BytesPerPixel, ScanlineLayout};
pub use crate::error::{Result, UnfilterError};
pub use crate::filter::{FilterType, Kernel};

use log::{debug, trace};

/// Reverses the filters of `height` scanlines of `bytes_per_line` bytes each, in place.
///
/// `bpp` is the distance in bytes between a byte and its left neighbor, `1`, `2`, `3`, `4`, `6`
/// or `8`. The buffer may be longer than `height * bytes_per_line`, trailing bytes are not
/// touched.
///
/// The whole buffer is validated before anything is written: on error it is left unmodified.
pub fn reverse_filters(
    buffer: &mut [u8],
    height: usize,
    bpp: usize,
    bytes_per_line: usize,
) -> Result {
    Kernel::Simd.reverse_filters(buffer, height, bpp, bytes_per_line)
}

impl Kernel {
    /// Same as [`reverse_filters`](crate::reverse_filters), using this kernel.
    pub fn reverse_filters(
        self,
        buffer: &mut [u8],
        height: usize,
        bpp: usize,
        bytes_per_line: usize,
    ) -> Result {
        let layout = ScanlineLayout::from_parts(height, bpp, bytes_per_line).map_err(|err| {
            debug!("rejecting scanline geometry: {}", err);
            err
        })?;
        unfilter_image(self, buffer, &layout)
    }
}

/// Reverses the filters of all scanlines described by `layout` using `kernel`.
///
/// Fails if the buffer is shorter than the layout or a scanline has an unknown filter type, in
/// which case the buffer is left unmodified.
pub fn unfilter_image(kernel: Kernel, buffer: &mut [u8], layout: &ScanlineLayout) -> Result {
    validate(buffer, layout).map_err(|err| {
        debug!(
            "rejecting {}x{} image with {} bytes per pixel: {}",
            layout.width(),
            layout.height(),
            layout.bpp().into_usize(),
            err
        );
        err
    })?;

    trace!(
        "unfiltering {}x{} image with {} bytes per pixel using the {} kernel",
        layout.width(),
        layout.height(),
        layout.bpp().into_usize(),
        kernel.name()
    );
    kernel.run(buffer, layout);
    Ok(())
}

/// Checks everything the kernels rely on, without writing to the buffer.
fn validate(buffer: &[u8], layout: &ScanlineLayout) -> Result {
    if layout.height() == 0 {
        return Err(UnfilterError::ZeroHeight);
    }
    if layout.bytes_per_line() == 0 {
        return Err(UnfilterError::InvalidLineLength {
            bpp: layout.bpp().into_usize(),
            bytes_per_line: 0,
        });
    }

    let expected = layout.buffer_len();
    if buffer.len() < expected {
        return Err(UnfilterError::BufferTooSmall {
            expected,
            actual: buffer.len(),
        });
    }

    for y in 0..layout.height() {
        let tag = buffer[layout.row_range(y).start];
        if FilterType::from_u8(tag).is_none() {
            return Err(UnfilterError::UnknownFilter { row: y, tag });
        }
    }

    Ok(())
}
