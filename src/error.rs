//! Crate-wide error type.
//!
//! Structural and configuration errors always propagate to the driver.
//! Local numerical edge cases (drying, clamped transports) are absorbed and
//! counted unless strict mode promotes them to [`BarotropicError::Instability`].

use thiserror::Error;

use crate::grid::GridExtent;
use crate::io::RestartError;
use crate::types::{GridLocation, Side};

/// Errors raised by the barotropic core.
#[derive(Debug, Error)]
pub enum BarotropicError {
    /// Invalid configuration parameter or grid definition.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A field or array does not match the grid extent.
    #[error("Shape mismatch for {name}: expected {expected}, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A field was supplied at the wrong staggered-grid point.
    #[error("Field {name} must live at {expected}, got {actual}")]
    LocationMismatch {
        name: String,
        expected: GridLocation,
        actual: GridLocation,
    },

    /// A side marked open in the grid has no elevation series.
    #[error("Open {side} boundary has no elevation series")]
    MissingBoundarySeries { side: Side },

    /// Requested time lies outside the supplied boundary series.
    #[error("Time {time} s outside {side} boundary series [{start}, {end}] s")]
    OutOfDomain {
        side: Side,
        time: f64,
        start: f64,
        end: f64,
    },

    /// Numerical instability (fatal in strict mode, or non-finite values).
    #[error("Numerical instability at step {step}: {message}")]
    Instability { step: u64, message: String },

    /// Wave-breaking fields requested but the feature is not enabled.
    #[error("Wave breaking is not enabled for this state")]
    FeatureDisabled,

    /// Reallocation attempted while short steps are still being averaged.
    #[error("Cannot reallocate: averaging window open after {position} of {mode_split} short steps")]
    WindowOpen { position: usize, mode_split: usize },

    /// Halo exchange collaborator failed.
    #[error("Halo exchange failed: {0}")]
    HaloExchange(String),

    /// Restart read/write failure.
    #[error(transparent)]
    Restart(#[from] RestartError),
}

impl BarotropicError {
    /// Create a shape mismatch error between two grid extents.
    pub fn extent_mismatch(name: impl Into<String>, expected: GridExtent, actual: GridExtent) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a shape mismatch error between two lengths.
    pub fn length_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: format!("length {}", expected),
            actual: format!("length {}", actual),
        }
    }

    /// Whether this error is a configuration error detected at initialization.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::ShapeMismatch { .. }
                | Self::LocationMismatch { .. }
                | Self::MissingBoundarySeries { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BarotropicError>;
