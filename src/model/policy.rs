//! Observation policy: root margin and threshold steps.
//!
//! Both halves are parsed and validated at construction. Once an
//! [`ObservationPolicy`] exists it is immutable for the lifetime of the
//! multiplexer that was built from it.

use super::dimensions::Length;
use super::error::PolicyError;
use std::fmt;

/// Default root margin: pre-trigger slightly before an item scrolls in.
pub const DEFAULT_ROOT_MARGIN: &str = "10px";

/// Default threshold spread.
pub const DEFAULT_THRESHOLDS: [f64; 7] = [0.0, 0.25, 0.35, 0.5, 0.66, 0.75, 1.0];

/// Offsets applied to each side of the root before intersecting.
///
/// Parsed from CSS margin shorthand: one to four components, each `<n>px`,
/// `<n>%` or a bare `0`. Positive values grow the root outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    /// Top offset (percentages resolve against root height).
    pub top: Length,
    /// Right offset (percentages resolve against root width).
    pub right: Length,
    /// Bottom offset (percentages resolve against root height).
    pub bottom: Length,
    /// Left offset (percentages resolve against root width).
    pub left: Length,
}

impl RootMargin {
    /// Zero margin on every side.
    pub const ZERO: Self = Self {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };

    /// Parse CSS margin shorthand.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidRootMargin`] when the input has no
    /// components, more than four, or a component that is not a length.
    pub fn parse(input: &str) -> Result<Self, PolicyError> {
        let invalid = |reason: &str| PolicyError::InvalidRootMargin {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let parts = input
            .split_whitespace()
            .map(|part| {
                if part == "0" {
                    Ok(Length::Px(0.0))
                } else {
                    Length::parse(part).map_err(|_| invalid("components must be <n>px or <n>%"))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // CSS shorthand: top [right [bottom [left]]]
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            [] => return Err(invalid("expected at least one component")),
            _ => return Err(invalid("expected at most four components")),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        let px = Length::Px(10.0);
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Ordered visibility-ratio steps at which crossings are reported.
///
/// Always non-empty, every value in `[0, 1]`, sorted ascending, no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    /// Validate, sort and de-duplicate a list of thresholds.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::EmptyThresholds`] if `values` is empty
    /// - [`PolicyError::ThresholdOutOfRange`] for NaN or values outside `[0, 1]`
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, PolicyError> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(PolicyError::EmptyThresholds);
        }
        if let Some(bad) = values
            .iter()
            .copied()
            .find(|v| v.is_nan() || !(0.0..=1.0).contains(v))
        {
            return Err(PolicyError::ThresholdOutOfRange(bad));
        }

        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self(values))
    }

    /// Parse a comma separated list such as `"0, 0.25, 1"`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidThresholdList`] for unparsable numbers,
    /// otherwise the same errors as [`Thresholds::new`].
    pub fn parse_list(input: &str) -> Result<Self, PolicyError> {
        let values = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| PolicyError::InvalidThresholdList(input.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }

    /// Threshold values in ascending order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of threshold steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the step a ratio currently sits in.
    ///
    /// `None` when the target is not intersecting at all. Otherwise the number
    /// of thresholds the ratio has reached. Two observations fire distinct
    /// crossings exactly when their step indices differ.
    pub fn step_index(&self, is_intersecting: bool, ratio: f64) -> Option<usize> {
        if !is_intersecting {
            return None;
        }
        Some(self.0.iter().take_while(|t| ratio >= **t).count())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS.to_vec())
    }
}

/// Everything a multiplexer needs to configure its native tracker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationPolicy {
    root_margin: RootMargin,
    thresholds: Thresholds,
}

impl ObservationPolicy {
    /// Build a policy from a CSS margin string and threshold values.
    ///
    /// # Errors
    ///
    /// Propagates margin and threshold validation errors.
    pub fn new(
        root_margin: &str,
        thresholds: impl IntoIterator<Item = f64>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            root_margin: RootMargin::parse(root_margin)?,
            thresholds: Thresholds::new(thresholds)?,
        })
    }

    /// Build a policy from already validated parts.
    pub fn from_parts(root_margin: RootMargin, thresholds: Thresholds) -> Self {
        Self {
            root_margin,
            thresholds,
        }
    }

    /// Root margin.
    pub fn root_margin(&self) -> &RootMargin {
        &self.root_margin
    }

    /// Threshold steps.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}
