//! Common types shared between the kernels and the harness

use core::ops::Range;

use crate::error::UnfilterError;

/// Number of bytes per pixel, i.e. the distance between a byte and its `left` neighbor.
///
/// This is the closed set of strides that the PNG format can produce for 8 and 16 bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BytesPerPixel {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Six = 6,
    Eight = 8,
}

impl BytesPerPixel {
    /// Every supported stride, in ascending order.
    pub const ALL: [BytesPerPixel; 6] = [
        BytesPerPixel::One,
        BytesPerPixel::Two,
        BytesPerPixel::Three,
        BytesPerPixel::Four,
        BytesPerPixel::Six,
        BytesPerPixel::Eight,
    ];

    /// usize -> Self, `None` for strides no PNG color type produces.
    pub fn from_usize(bpp: usize) -> Option<Self> {
        match bpp {
            1 => Some(BytesPerPixel::One),
            2 => Some(BytesPerPixel::Two),
            3 => Some(BytesPerPixel::Three),
            4 => Some(BytesPerPixel::Four),
            6 => Some(BytesPerPixel::Six),
            8 => Some(BytesPerPixel::Eight),
            _ => None,
        }
    }

    pub fn into_usize(self) -> usize {
        self as usize
    }
}

/// Geometry of a buffer of filtered scanlines.
///
/// Every scanline is `bytes_per_line` bytes long: one filter type byte followed by
/// `width * bpp` pixel bytes. Lines are stored back to back without padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineLayout {
    height: usize,
    bpp: BytesPerPixel,
    bytes_per_line: usize,
}

impl ScanlineLayout {
    /// Layout of an image that is `width` pixels wide.
    ///
    /// A width whose scanlines do not fit in `usize` gives a line length of zero, which
    /// [`unfilter_image`](crate::unfilter_image) rejects.
    pub fn new(width: usize, height: usize, bpp: BytesPerPixel) -> Self {
        let bytes_per_line = width
            .checked_mul(bpp.into_usize())
            .and_then(|len| len.checked_add(1))
            .unwrap_or(0);

        ScanlineLayout {
            height,
            bpp,
            bytes_per_line,
        }
    }

    /// Layout from the raw parameters of a decoder, validating that they describe whole pixels.
    pub fn from_parts(
        height: usize,
        bpp: usize,
        bytes_per_line: usize,
    ) -> Result<Self, UnfilterError> {
        let tbpp = BytesPerPixel::from_usize(bpp).ok_or(UnfilterError::UnsupportedBpp(bpp))?;
        if height == 0 {
            return Err(UnfilterError::ZeroHeight);
        }
        if bytes_per_line == 0 || (bytes_per_line - 1) % bpp != 0 {
            return Err(UnfilterError::InvalidLineLength {
                bpp,
                bytes_per_line,
            });
        }
        // The product has to fit in the address space, otherwise no buffer can be large enough.
        height
            .checked_mul(bytes_per_line)
            .ok_or(UnfilterError::BufferTooSmall {
                expected: usize::MAX,
                actual: 0,
            })?;

        Ok(ScanlineLayout {
            height,
            bpp: tbpp,
            bytes_per_line,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bpp(&self) -> BytesPerPixel {
        self.bpp
    }

    /// Length of a scanline including the filter type byte.
    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.row_len() / self.bpp.into_usize()
    }

    /// Number of pixel bytes in a scanline, excluding the filter type byte.
    pub fn row_len(&self) -> usize {
        self.bytes_per_line.saturating_sub(1)
    }

    /// Number of bytes covered by all scanlines, `usize::MAX` if that does not fit.
    pub fn buffer_len(&self) -> usize {
        self.height.saturating_mul(self.bytes_per_line)
    }

    /// Byte range of scanline `y`, starting at its filter type byte.
    pub fn row_range(&self, y: usize) -> Range<usize> {
        let start = y * self.bytes_per_line;
        start..start + self.bytes_per_line
    }
}
