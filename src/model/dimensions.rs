//! Lengths, dimensions and box styles exchanged with the host.

use super::error::PolicyError;
use std::fmt;

/// A CSS-like length: absolute pixels or a percentage of a reference size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the reference size the host resolves against.
    Percent(f64),
}

impl Length {
    /// Parse `<n>px` or `<n>%`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidLength`] for any other shape.
    pub fn parse(input: &str) -> Result<Self, PolicyError> {
        let trimmed = input.trim();
        let invalid = || PolicyError::InvalidLength {
            input: input.to_string(),
        };

        let (number, ctor): (&str, fn(f64) -> Length) =
            if let Some(n) = trimmed.strip_suffix("px") {
                (n, Length::Px)
            } else if let Some(n) = trimmed.strip_suffix('%') {
                (n, Length::Percent)
            } else {
                return Err(invalid());
            };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(ctor(value))
    }

    /// Resolve to pixels against a reference size.
    pub fn resolve(&self, reference: f64) -> f64 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// One axis of a cell's cached size.
///
/// `Auto` is a distinct sentinel and is never conflated with `Px(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    /// Let the host size this axis.
    #[default]
    Auto,
    /// Pinned to a whole number of pixels.
    Px(u32),
}

impl Dimension {
    /// Pixel value if pinned.
    pub fn px(&self) -> Option<u32> {
        match *self {
            Dimension::Auto => None,
            Dimension::Px(px) => Some(px),
        }
    }

    /// Whether this axis is still `Auto`.
    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => write!(f, "auto"),
            Dimension::Px(px) => write!(f, "{px}px"),
        }
    }
}

/// Rendered size of a committed box, in (possibly fractional) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl BoxSize {
    /// Zero-area size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size cached by a deferred cell for placeholder rendering.
///
/// Starts as `auto × auto`. Once pinned, an axis is only ever replaced by a
/// newer measurement and never cleared back to `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDimensions {
    width: Dimension,
    height: Dimension,
}

impl CellDimensions {
    /// Width axis.
    pub fn width(&self) -> Dimension {
        self.width
    }

    /// Height axis.
    pub fn height(&self) -> Dimension {
        self.height
    }

    /// Whether a measurement has been pinned.
    pub fn is_pinned(&self) -> bool {
        !self.height.is_auto()
    }

    /// Pin both axes to a measured box, rounding up to whole pixels.
    ///
    /// Negative and non-finite readings pin to zero.
    pub fn pin(&mut self, measured: BoxSize) {
        self.width = Dimension::Px(ceil_px(measured.width));
        self.height = Dimension::Px(ceil_px(measured.height));
    }
}

impl fmt::Display for CellDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

fn ceil_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        // `as` saturates at u32::MAX
        value.ceil() as u32
    } else {
        0
    }
}

/// Style a cell asks the host to lay its box out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    /// Width constraint.
    pub width: Dimension,
    /// Height constraint.
    pub height: Dimension,
    /// Floor applied to the resolved height, if any.
    pub min_height: Option<Length>,
}

impl BoxStyle {
    /// Unconstrained box: intrinsic size is observable.
    pub const AUTO: Self = Self {
        width: Dimension::Auto,
        height: Dimension::Auto,
        min_height: None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_parses_pixels_and_percent() {
        assert_eq!(Length::parse("100px").unwrap(), Length::Px(100.0));
        assert_eq!(Length::parse("10%").unwrap(), Length::Percent(10.0));
        assert_eq!(Length::parse(" 2.5px ").unwrap(), Length::Px(2.5));
    }

    #[test]
    fn length_rejects_missing_unit() {
        assert!(Length::parse("100").is_err());
        assert!(Length::parse("px").is_err());
        assert!(Length::parse("infpx").is_err());
    }

    #[test]
    fn percent_resolves_against_reference() {
        assert_eq!(Length::Percent(10.0).resolve(600.0), 60.0);
        assert_eq!(Length::Px(100.0).resolve(600.0), 100.0);
    }

    #[test]
    fn cell_dimensions_start_auto() {
        let dims = CellDimensions::default();
        assert_eq!(dims.width(), Dimension::Auto);
        assert_eq!(dims.height(), Dimension::Auto);
        assert!(!dims.is_pinned());
    }

    #[test]
    fn pin_rounds_up_to_whole_pixels() {
        let mut dims = CellDimensions::default();
        dims.pin(BoxSize::new(299.2, 119.01));
        assert_eq!(dims.width(), Dimension::Px(300));
        assert_eq!(dims.height(), Dimension::Px(120));
    }

    #[test]
    fn pin_zero_is_pinned_not_auto() {
        let mut dims = CellDimensions::default();
        dims.pin(BoxSize::ZERO);
        assert_eq!(dims.height(), Dimension::Px(0));
        assert!(dims.is_pinned());
    }

    #[test]
    fn pin_clamps_garbage_readings_to_zero() {
        let mut dims = CellDimensions::default();
        dims.pin(BoxSize::new(f64::NAN, -4.0));
        assert_eq!(dims.width(), Dimension::Px(0));
        assert_eq!(dims.height(), Dimension::Px(0));
    }

    #[test]
    fn display_formats() {
        let mut dims = CellDimensions::default();
        assert_eq!(dims.to_string(), "auto×auto");
        dims.pin(BoxSize::new(300.0, 120.0));
        assert_eq!(dims.to_string(), "300px×120px");
    }
}
