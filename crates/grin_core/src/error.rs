//! Errors raised while constructing or importing a GRIN field.

use thiserror::Error;

/// Errors that can occur while validating field parameters.
///
/// All of these are raised at construction time; integration never fails
/// with an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrinError {
    #[error("Parameter `{0}` must be finite")]
    NonFinite(&'static str),

    #[error("Inner radius must be non-negative, got {0}")]
    NegativeInnerRadius(f64),

    #[error("Outer radius {outer} must be greater than inner radius {inner}")]
    InvalidRadii { inner: f64, outer: f64 },

    #[error("Step size must be positive, got {0}")]
    NonPositiveStepSize(f64),

    #[error("Step limit must be at least {min}, got {got}")]
    StepLimitTooSmall { got: u32, min: u32 },

    #[error("Parameter `{param}` must be positive, got {value}")]
    NonPositiveIor { param: &'static str, value: f64 },

    #[error("Gamma must be non-negative, got {0}")]
    NegativeGamma(f64),

    #[error("Stretch must be positive, got {0}")]
    NonPositiveStretch(f64),

    #[error("Missing property: {0}")]
    MissingProperty(String),

    #[error("Property `{key}` has the wrong type, expected {expected}")]
    PropertyType { key: String, expected: &'static str },

    #[error("Unknown GRIN profile: {0}")]
    UnknownProfile(String),

    #[error("Property map has type `{0}`, expected `grin`")]
    WrongVolumeType(String),
}

pub type GrinResult<T> = Result<T, GrinError>;
