//! Error types for sightline.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error at the binary boundary
//!   - [`PolicyError`] - Invalid root margin, thresholds or lengths
//!   - [`ConfigError`](crate::config::ConfigError) - Config file read/parse failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing subscriber setup failures
//!   - [`ScopeError`] - Programming-contract violations of a multiplexer scope
//!   - `std::io::Error` - Terminal failures
//!
//! # Runtime failures are absorbed
//!
//! None of the visibility runtime paths return errors. A missing rendering
//! surface degrades to an inert multiplexer, stale deliveries are dropped, and
//! zero-size measurements are pinned as-is. The only runtime error is
//! [`ScopeError::AlreadyMounted`], which is fatal to the scope that raised it.

use thiserror::Error;

/// Top-level application error for the demo binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Configured observation policy is invalid.
    #[error("Invalid observation policy: {0}")]
    Policy(#[from] PolicyError),

    /// A multiplexer scope was mounted twice.
    #[error("Scope error: {0}")]
    Scope(#[from] ScopeError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error.
    ///
    /// Fatal: without a working terminal the demo cannot function.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors raised while building an observation policy or a length.
///
/// These only occur at configuration time. Once a policy exists it is valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// Root margin is not valid CSS margin shorthand.
    #[error("Invalid root margin {input:?}: {reason}")]
    InvalidRootMargin {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A threshold lies outside `[0, 1]` or is NaN.
    #[error("Threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),

    /// No thresholds were given.
    #[error("At least one threshold is required")]
    EmptyThresholds,

    /// Threshold list contains something that is not a number.
    #[error("Invalid threshold list {0:?}")]
    InvalidThresholdList(String),

    /// A length is not `<n>px` or `<n>%`.
    #[error("Invalid length {input:?}: expected <n>px or <n>%")]
    InvalidLength {
        /// The rejected input.
        input: String,
    },
}

/// Contract violations of a [`MultiplexerScope`](crate::observer::MultiplexerScope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope was asked to construct a second multiplexer.
    ///
    /// Fatal to the scope: it terminates its multiplexer and stays terminated.
    #[error("Scope already constructed its multiplexer")]
    AlreadyMounted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_from_policy_error() {
        let err: AppError = PolicyError::EmptyThresholds.into();
        assert!(matches!(err, AppError::Policy(PolicyError::EmptyThresholds)));
    }

    #[test]
    fn app_error_from_io_error() {
        let err: AppError = std::io::Error::other("tty gone").into();
        assert!(matches!(err, AppError::Terminal(_)));
    }

    #[test]
    fn policy_error_messages_name_the_input() {
        let err = PolicyError::InvalidLength {
            input: "wide".to_string(),
        };
        assert!(err.to_string().contains("\"wide\""));
    }
}
