//! Error types for pixvtx-core.

use thiserror::Error;

/// Result type alias for pixvtx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for pixvtx operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation errors.
///
/// These are raised once, when a filter is constructed, and never per event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The threshold polynomial has no coefficients.
    #[error("cluster_pars must contain at least one coefficient")]
    EmptyCoefficients,

    /// The scan step is zero or negative.
    #[error("z_step must be positive, got {0}")]
    NonPositiveStep(f64),

    /// The scan range is inverted.
    #[error("min_z ({min_z}) must not exceed max_z ({max_z})")]
    InvertedRange { min_z: f64, max_z: f64 },

    /// The range holds more candidate positions than a scan may visit.
    #[error("scan range ({min_z}, {max_z}) with step {z_step} exceeds {max} candidate positions")]
    TooManyCandidates {
        min_z: f64,
        max_z: f64,
        z_step: f64,
        max: usize,
    },

    /// A numeric field is NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    /// The quality control offset is negative.
    #[error("control_offset must be non-negative, got {0}")]
    InvalidOffset(f64),
}
