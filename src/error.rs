//! Error types for the snowball simulator

use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SnowballError>;

/// Main error type for simulator operations
#[derive(Error, Debug)]
pub enum SnowballError {
    /// Invalid protocol or run configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Construction-time configuration errors.
///
/// These are the only errors a simulation can produce; once a run has been
/// built, stepping it is infallible.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sample size `k` must be at least 1
    #[error("sample size must be positive")]
    ZeroSampleSize,

    /// Quorum size `α` must lie in `[1, k]`
    #[error("quorum size {quorum} must be between 1 and sample size {sample_size}")]
    QuorumOutOfRange { quorum: usize, sample_size: usize },

    /// Decision threshold `β` must be at least 1
    #[error("decision threshold {threshold} must be at least 1")]
    ThresholdTooLow { threshold: usize },

    /// A node cannot sample more peers than exist besides itself
    #[error("sample size {sample_size} leaves no room for self-exclusion in a population of {population}")]
    SampleExceedsPopulation { sample_size: usize, population: usize },

    /// A simulation needs at least one node
    #[error("population must not be empty")]
    EmptyPopulation,

    /// Initial preference weights are unusable
    #[error("invalid preference weights: {reason}")]
    InvalidWeights { reason: String },
}

impl SnowballError {
    /// Create a configuration error from a [`ConfigError`]
    pub fn config(err: ConfigError) -> Self {
        SnowballError::Config(err)
    }

    /// Whether this error came from configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, SnowballError::Config(_))
    }
}

impl ConfigError {
    /// Create an invalid-weights error
    pub fn invalid_weights<T: Into<String>>(reason: T) -> Self {
        ConfigError::InvalidWeights {
            reason: reason.into(),
        }
    }
}
