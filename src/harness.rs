//! Tools for checking kernels against each other.
//!
//! [`random_image`] builds deterministic filtered images from a fixed byte table, [`compare`]
//! reports the first byte where two unfiltered images disagree and [`check`] runs a kernel over
//! a grid of image sizes, strides and filter patterns against [`Kernel::Reference`].

use std::{error, fmt};

use crate::{unfilter_image, BytesPerPixel, FilterType, Kernel, ScanlineLayout, UnfilterError};

/// Source bytes for [`random_image`]. Contains runs of `0x00`, `0x01` and `0xFF` to exercise
/// wraparound.
const RANDOM_DATA: [u8; 299] = [
    0xD9, 0xFA, 0xA7, 0x20, 0x6B, 0xD3, 0x41, 0xC9, 0x1A, 0x27, 0x2F, 0x64, 0x59, 0x85, 0x47, 0x1C,
    0xFC, 0x3E, 0xA3, 0x5B, 0x3C, 0xD2, 0xB5, 0xB6, 0x80, 0xBB, 0x84, 0x3C, 0xD4, 0x94, 0x3A, 0x6D,
    0xC2, 0x1B, 0x3D, 0x5F, 0x82, 0xD9, 0x1A, 0x7F, 0xC6, 0x8D, 0x39, 0xDD, 0x07, 0xAD, 0x7A, 0x40,
    0x8D, 0x37, 0x56, 0x12, 0x8B, 0x51, 0xAF, 0x9D, 0x17, 0xBD, 0xD0, 0x61, 0x58, 0xC8, 0x05, 0x44,
    0x9B, 0xCA, 0xD4, 0xD0, 0xD0, 0xB9, 0x83, 0x75, 0x31, 0x4B, 0x09, 0xEC, 0x52, 0xEB, 0xE5, 0xE8,
    0xAA, 0xF6, 0xDD, 0x79, 0x36, 0x61, 0x17, 0xB1, 0x8A, 0x48, 0x00, 0x1A, 0x9D, 0xDC, 0x51, 0x9F,
    0x34, 0x7A, 0x48, 0x56, 0xC9, 0xF3, 0x6A, 0x81, 0x9B, 0x47, 0x56, 0x64, 0x00, 0x30, 0x60, 0x04,
    0x90, 0x4B, 0xC2, 0x48, 0xE3, 0xED, 0x62, 0xDF, 0x46, 0xEF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFE, 0x94, 0xEE, 0x00, 0xA9, 0x3B, 0x86, 0x9B, 0xD8, 0xEE, 0x3D, 0x9E, 0x32, 0x00,
    0x00, 0x00, 0x00, 0x92, 0x61, 0x9F, 0x3B, 0x22, 0xB0, 0xB9, 0xB3, 0xB0, 0x01, 0x01, 0x01, 0x01,
    0xF4, 0x83, 0xFC, 0x49, 0xA9, 0xD2, 0x89, 0xE0, 0x17, 0x74, 0x3E, 0xBD, 0x28, 0x74, 0x5E, 0xF8,
    0x6D, 0xD2, 0x43, 0xB7, 0x5A, 0xB5, 0xE6, 0xA4, 0xC7, 0xA4, 0x46, 0xD3, 0x00, 0x1A, 0x26, 0x0C,
    0x65, 0x24, 0xAD, 0xA7, 0xEA, 0xF4, 0xBD, 0xF6, 0x63, 0x2B, 0xEC, 0x1E, 0xDF, 0x0C, 0xBD, 0x50,
    0xEB, 0x71, 0xD9, 0x86, 0x31, 0x62, 0x5E, 0xE7, 0x4D, 0x8B, 0xD1, 0x11, 0x5B, 0x26, 0x48, 0x9F,
    0x8E, 0xE6, 0x7B, 0xE1, 0x0C, 0xF8, 0xCD, 0xF8, 0x90, 0x1E, 0x4E, 0x24, 0xFE, 0x90, 0xD3, 0xA2,
    0x2D, 0xFC, 0x4F, 0x3A, 0x2F, 0x1B, 0xE2, 0xB8, 0xBF, 0x11, 0x68, 0x80, 0xCB, 0x26, 0xAD, 0x1C,
    0x58, 0x4E, 0x57, 0x30, 0x00, 0x00, 0x00, 0x86, 0x4A, 0x50, 0x36, 0x90, 0x5C, 0x40, 0xA7, 0x38,
    0x92, 0x03, 0xF0, 0x39, 0x82, 0x40, 0xED, 0x39, 0x22, 0x82, 0x90, 0x67, 0xDF, 0x95, 0x34, 0x15,
    0x8A, 0x0F, 0x25, 0x94, 0x56, 0xFD, 0x38, 0x85, 0x9B, 0x06, 0x22,
];

/// Which filter types the rows of a generated image are tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPattern {
    /// Every row but the first uses the same filter.
    Uniform(FilterType),
    /// Rows cycle through `None`, `Sub`, `Up`, `Avg` and `Paeth`, starting on the second row.
    Mixed,
}

impl FilterPattern {
    pub const ALL: [FilterPattern; 6] = [
        FilterPattern::Uniform(FilterType::NoFilter),
        FilterPattern::Uniform(FilterType::Sub),
        FilterPattern::Uniform(FilterType::Up),
        FilterPattern::Uniform(FilterType::Avg),
        FilterPattern::Uniform(FilterType::Paeth),
        FilterPattern::Mixed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterPattern::Uniform(filter) => filter.name(),
            FilterPattern::Mixed => "Mixed",
        }
    }

    /// Filter type byte of row `y`. The first row is never filtered.
    fn tag(self, y: usize) -> u8 {
        match self {
            _ if y == 0 => FilterType::NoFilter as u8,
            FilterPattern::Uniform(filter) => filter as u8,
            FilterPattern::Mixed => FilterType::ALL[(y - 1) % FilterType::ALL.len()] as u8,
        }
    }
}

impl fmt::Display for FilterPattern {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

/// Builds a filtered image of `height` scanlines whose pixel bytes are taken from a fixed table.
///
/// Two cursors walk the table, one from `seed` in steps of one and one from `seed * 33` in steps
/// of two; within a row the bytes alternate between them, starting with the first. The same
/// arguments always give the same image.
pub fn random_image(
    width: usize,
    height: usize,
    bpp: BytesPerPixel,
    pattern: FilterPattern,
    seed: u32,
) -> Vec<u8> {
    let layout = ScanlineLayout::new(width, height, bpp);
    let count = RANDOM_DATA.len();
    let mut cursor0 = seed as usize % count;
    let mut cursor1 = seed.wrapping_mul(33) as usize % count;

    let mut image = Vec::with_capacity(layout.buffer_len());
    for y in 0..height {
        image.push(pattern.tag(y));
        for x in 0..layout.row_len() {
            if x % 2 == 0 {
                image.push(RANDOM_DATA[cursor0]);
                cursor0 = (cursor0 + 1) % count;
            } else {
                image.push(RANDOM_DATA[cursor1]);
                cursor1 = (cursor1 + 2) % count;
            }
        }
    }
    image
}

/// The first difference between two unfiltered images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// One of the buffers does not cover the layout.
    Length { expected: usize, actual: usize },
    /// The filter type bytes of row `row` differ.
    FilterType {
        row: usize,
        expected: u8,
        actual: u8,
    },
    /// Both images carry the same filter type byte, but it is not a valid one.
    InvalidFilter { row: usize, tag: u8 },
    /// Byte `channel` of pixel `column` in row `row` differs.
    Pixel {
        row: usize,
        column: usize,
        channel: usize,
        expected: u8,
        actual: u8,
        filter: FilterType,
    },
}

impl error::Error for Mismatch {}

impl fmt::Display for Mismatch {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Length { expected, actual } => write!(
                fmt,
                "Expected a buffer of at least {} bytes, found {} bytes",
                expected, actual
            ),
            Self::FilterType {
                row,
                expected,
                actual,
            } => write!(fmt, "Y={} X=Filter: filter {} != {}", row, expected, actual),
            Self::InvalidFilter { row, tag } => {
                write!(fmt, "Y={} X=Filter: invalid filter {}", row, tag)
            }
            Self::Pixel {
                row,
                column,
                channel,
                expected,
                actual,
                filter,
            } => write!(
                fmt,
                "Y={} X={} Byte={}: pixel {} != {} ({})",
                row,
                column,
                channel,
                expected,
                actual,
                filter.name()
            ),
        }
    }
}

/// Compares two unfiltered images laid out as `layout`, reporting the first difference.
pub fn compare(expected: &[u8], actual: &[u8], layout: &ScanlineLayout) -> Result<(), Mismatch> {
    let len = layout.buffer_len();
    for buffer in [expected, actual] {
        if buffer.len() < len {
            return Err(Mismatch::Length {
                expected: len,
                actual: buffer.len(),
            });
        }
    }

    let bpp = layout.bpp().into_usize();
    for row in 0..layout.height() {
        let range = layout.row_range(row);
        let (expected_tag, expected) = expected[range.clone()].split_at(1);
        let (actual_tag, actual) = actual[range].split_at(1);

        if expected_tag != actual_tag {
            return Err(Mismatch::FilterType {
                row,
                expected: expected_tag[0],
                actual: actual_tag[0],
            });
        }
        let filter = FilterType::from_u8(expected_tag[0]).ok_or(Mismatch::InvalidFilter {
            row,
            tag: expected_tag[0],
        })?;

        let first_diff = expected.iter().zip(actual).position(|(e, a)| e != a);
        if let Some(i) = first_diff {
            return Err(Mismatch::Pixel {
                row,
                column: i / bpp,
                channel: i % bpp,
                expected: expected[i],
                actual: actual[i],
                filter,
            });
        }
    }

    Ok(())
}

/// One image of the [`check`] grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckCase {
    pub pattern: FilterPattern,
    pub width: usize,
    pub height: usize,
    pub bpp: BytesPerPixel,
    pub seed: u32,
}

impl CheckCase {
    pub fn layout(&self) -> ScanlineLayout {
        ScanlineLayout::new(self.width, self.height, self.bpp)
    }

    pub fn image(&self) -> Vec<u8> {
        random_image(self.width, self.height, self.bpp, self.pattern, self.seed)
    }
}

impl fmt::Display for CheckCase {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "[{}x{}|bpp:{}|bpl={}|{}|seed={}]",
            self.width,
            self.height,
            self.bpp.into_usize(),
            self.layout().bytes_per_line(),
            self.pattern,
            self.seed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A kernel refused an image the generator produced.
    Rejected(UnfilterError),
    Mismatch(Mismatch),
}

/// A kernel that disagreed with the reference on one case of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub kernel: Kernel,
    pub case: CheckCase,
    pub error: CheckError,
}

impl error::Error for CheckFailure {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.error {
            CheckError::Rejected(err) => Some(err),
            CheckError::Mismatch(err) => Some(err),
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "IMPL={:<4} {} ", self.kernel.name(), self.case)?;
        match &self.error {
            CheckError::Rejected(err) => write!(fmt, "rejected: {}", err),
            CheckError::Mismatch(err) => write!(fmt, "{}", err),
        }
    }
}

/// Unfilters the image of `case` with `kernel` and with the reference kernel and compares them.
pub fn check_case(kernel: Kernel, case: &CheckCase) -> Result<(), CheckFailure> {
    let fail = |error| CheckFailure {
        kernel,
        case: *case,
        error,
    };
    let layout = case.layout();
    let mut expected = case.image();
    let mut actual = expected.clone();

    unfilter_image(Kernel::Reference, &mut expected, &layout)
        .map_err(|err| fail(CheckError::Rejected(err)))?;
    unfilter_image(kernel, &mut actual, &layout).map_err(|err| fail(CheckError::Rejected(err)))?;
    compare(&expected, &actual, &layout).map_err(|err| fail(CheckError::Mismatch(err)))
}

/// Checks `kernel` against the reference on every filter pattern, height `1..20`, width `1..100`
/// and stride. The seed is bumped for every case so each one sees different bytes.
///
/// Returns the number of cases checked.
pub fn check(kernel: Kernel) -> Result<usize, CheckFailure> {
    let mut seed = 0;
    for pattern in FilterPattern::ALL {
        for height in 1..20 {
            for width in 1..100 {
                for bpp in BytesPerPixel::ALL {
                    let case = CheckCase {
                        pattern,
                        width,
                        height,
                        bpp,
                        seed,
                    };
                    check_case(kernel, &case)?;
                    seed += 1;
                }
            }
        }
    }
    Ok(seed as usize)
}
