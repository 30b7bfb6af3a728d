use crate::common::ScanlineLayout;

pub(crate) mod math;
pub(crate) mod paeth;
pub(crate) mod reference;
pub(crate) mod scalar;
pub(crate) mod simd;

/// The byte level filter applied to a scanline by the encoder.
///
/// Every scanline starts with one of these as a tag byte. Note that the filters do not operate
/// on pixels but on raw bytes of a scanline, using the byte `bpp` positions to the left, the
/// byte above and the byte above-left as predictors.
///
/// Details on how each filter works can be found in the [PNG Book].
///
/// [PNG Book]: http://www.libpng.org/pub/png/book/chapter09.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
    NoFilter = 0,
    Sub = 1,
    Up = 2,
    Avg = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::NoFilter,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Avg,
        FilterType::Paeth,
    ];

    /// u8 -> Self. Returns `None` for tags outside of `0..=4`.
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::NoFilter),
            1 => Some(Self::Sub),
            2 => Some(Self::Up),
            3 => Some(Self::Avg),
            4 => Some(Self::Paeth),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NoFilter => "None",
            Self::Sub => "Sub",
            Self::Up => "Up",
            Self::Avg => "Avg",
            Self::Paeth => "Paeth",
        }
    }

    /// The filter that gives the same result when there is no previous row.
    ///
    /// A missing row reads as zeros: `Up` then adds nothing and `Paeth` always predicts the
    /// left byte. `Avg` still halves the left byte, so it has its own first-row variant.
    pub(crate) fn for_first_row(self) -> Self {
        match self {
            Self::Up => Self::NoFilter,
            Self::Paeth => Self::Sub,
            other => other,
        }
    }
}

/// Selects one of the interchangeable unfiltering implementations.
///
/// All of them produce byte-identical output for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Byte at a time with a runtime stride. Slow, kept as the oracle for the others.
    Reference,
    /// Specialized for each stride at compile time.
    Scalar,
    /// 16 lanes wide where the recurrence allows it, falling back to scalar code otherwise.
    Simd,
}

impl Kernel {
    pub const ALL: [Kernel; 3] = [Kernel::Reference, Kernel::Scalar, Kernel::Simd];

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Reference => "Ref",
            Kernel::Scalar => "Opt",
            Kernel::Simd => "SIMD",
        }
    }

    /// Unfilters a buffer whose layout has already been validated.
    pub(crate) fn run(self, buffer: &mut [u8], layout: &ScanlineLayout) {
        match self {
            Kernel::Reference => reference::unfilter_image(buffer, layout),
            Kernel::Scalar => scalar::unfilter_image(buffer, layout),
            Kernel::Simd => simd::unfilter_image(buffer, layout),
        }
    }
}

/// A per-row unfiltering strategy, chosen once per image for a fixed stride.
pub(crate) trait RowUnfilter {
    /// Reverses `filter` on `current` in place. `previous` is the already unfiltered row
    /// above, or empty for the first row of the image.
    fn unfilter_row(&self, filter: FilterType, previous: &[u8], current: &mut [u8]);
}

/// Walks the scanlines top to bottom, handing every row and its reconstructed predecessor to
/// `kernel`. The filter type bytes are left as they are.
pub(crate) fn unfilter_rows<K: RowUnfilter>(kernel: K, buffer: &mut [u8], layout: &ScanlineLayout) {
    let mut previous: &[u8] = &[];

    for line in buffer[..layout.buffer_len()].chunks_exact_mut(layout.bytes_per_line()) {
        if let Some((tag, current)) = line.split_first_mut() {
            // Unknown tags are rejected before any row is touched; should one slip through the
            // row is left as it is.
            if let Some(filter) = FilterType::from_u8(*tag) {
                kernel.unfilter_row(filter, previous, current);
            }
            previous = current;
        }
    }
}

/// Instantiates `$strategy` for the stride of `$layout` and runs it over all scanlines.
macro_rules! dispatch_bpp {
    ($strategy:ident, $buffer:expr, $layout:expr) => {
        match $layout.bpp() {
            $crate::BytesPerPixel::One => {
                $crate::filter::unfilter_rows($strategy::<1>, $buffer, $layout)
            }
            $crate::BytesPerPixel::Two => {
                $crate::filter::unfilter_rows($strategy::<2>, $buffer, $layout)
            }
            $crate::BytesPerPixel::Three => {
                $crate::filter::unfilter_rows($strategy::<3>, $buffer, $layout)
            }
            $crate::BytesPerPixel::Four => {
                $crate::filter::unfilter_rows($strategy::<4>, $buffer, $layout)
            }
            $crate::BytesPerPixel::Six => {
                $crate::filter::unfilter_rows($strategy::<6>, $buffer, $layout)
            }
            $crate::BytesPerPixel::Eight => {
                $crate::filter::unfilter_rows($strategy::<8>, $buffer, $layout)
            }
        }
    };
}

pub(crate) use dispatch_bpp;
