use std::{error, fmt};

pub type Result<T = ()> = core::result::Result<T, UnfilterError>;

/// Reasons a buffer is refused before any scanline is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfilterError {
    /// Only strides of 1, 2, 3, 4, 6 and 8 bytes per pixel occur in PNG.
    UnsupportedBpp(usize),
    ZeroHeight,
    /// The line length is not one filter byte followed by whole pixels.
    InvalidLineLength {
        bpp: usize,
        bytes_per_line: usize,
    },
    BufferTooSmall { expected: usize, actual: usize },
    /// Scanline `row` starts with a filter type byte outside of `0..=4`.
    UnknownFilter { row: usize, tag: u8 },
}

impl error::Error for UnfilterError {}

impl fmt::Display for UnfilterError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnsupportedBpp(bpp) => {
                write!(fmt, "Unsupported number of bytes per pixel: {}", bpp)
            }
            Self::ZeroHeight => write!(fmt, "Image height must be greater than zero"),
            Self::InvalidLineLength {
                bpp,
                bytes_per_line,
            } => write!(
                fmt,
                "A line of {} bytes does not hold a filter byte and whole pixels of {} bytes",
                bytes_per_line, bpp
            ),
            Self::BufferTooSmall { expected, actual } => write!(
                fmt,
                "Expected at least {} bytes, found {} bytes",
                expected, actual
            ),
            Self::UnknownFilter { row, tag } => {
                write!(fmt, "Unknown filter type {} at scanline {}", tag, row)
            }
        }
    }
}
