//! Protocol parameters and run configuration

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default sample size `k`
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Default quorum size `α`
pub const DEFAULT_QUORUM_SIZE: usize = 9;

/// Default decision threshold `β`
pub const DEFAULT_DECISION_THRESHOLD: usize = 20;

/// Default number of nodes in a run
pub const DEFAULT_POPULATION_SIZE: usize = 400;

/// Default round cap
pub const DEFAULT_MAX_ROUNDS: u64 = 1000;

/// Snowball protocol parameters.
///
/// Fields are private so a value that exists has passed validation:
/// `k ≥ 1`, `1 ≤ α ≤ k`, and `β ≥ 1` unless built through [`SnowballConfig::eager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnowballParams")]
pub struct SnowballConfig {
    sample_size: usize,
    quorum_size: usize,
    decision_threshold: usize,
}

/// Unvalidated parameters as they appear in a config file
#[derive(Deserialize)]
struct SnowballParams {
    sample_size: usize,
    quorum_size: usize,
    decision_threshold: usize,
}

impl TryFrom<SnowballParams> for SnowballConfig {
    type Error = ConfigError;

    fn try_from(params: SnowballParams) -> std::result::Result<Self, Self::Error> {
        SnowballConfig::new(
            params.sample_size,
            params.quorum_size,
            params.decision_threshold,
        )
    }
}

impl SnowballConfig {
    /// Create validated parameters: sample size `k`, quorum size `α`,
    /// decision threshold `β`.
    pub fn new(
        sample_size: usize,
        quorum_size: usize,
        decision_threshold: usize,
    ) -> std::result::Result<Self, ConfigError> {
        Self::check_sampling(sample_size, quorum_size)?;
        if decision_threshold < 1 {
            return Err(ConfigError::ThresholdTooLow {
                threshold: decision_threshold,
            });
        }
        Ok(Self {
            sample_size,
            quorum_size,
            decision_threshold,
        })
    }

    /// Parameters with `β = 0`: a node decides on its first successful poll.
    ///
    /// Sits below the usual `β ≥ 1` range; useful for small hand-traced runs.
    pub fn eager(sample_size: usize, quorum_size: usize) -> std::result::Result<Self, ConfigError> {
        Self::check_sampling(sample_size, quorum_size)?;
        Ok(Self {
            sample_size,
            quorum_size,
            decision_threshold: 0,
        })
    }

    fn check_sampling(sample_size: usize, quorum_size: usize) -> std::result::Result<(), ConfigError> {
        if sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize);
        }
        if quorum_size == 0 || quorum_size > sample_size {
            return Err(ConfigError::QuorumOutOfRange {
                quorum: quorum_size,
                sample_size,
            });
        }
        Ok(())
    }

    /// Reject a sample size a population of `population` nodes cannot serve
    pub fn validate_for_population(&self, population: usize) -> std::result::Result<(), ConfigError> {
        if population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.sample_size > population - 1 {
            return Err(ConfigError::SampleExceedsPopulation {
                sample_size: self.sample_size,
                population,
            });
        }
        Ok(())
    }

    /// Sample size `k`
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Quorum size `α`
    pub fn quorum_size(&self) -> usize {
        self.quorum_size
    }

    /// Decision threshold `β`
    pub fn decision_threshold(&self) -> usize {
        self.decision_threshold
    }
}

impl Default for SnowballConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            quorum_size: DEFAULT_QUORUM_SIZE,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

/// Order in which undecided nodes are updated within a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOrder {
    /// Ascending node index
    #[default]
    Ascending,
    /// A fresh permutation every round, drawn from the run's random stream
    Shuffled,
}

/// Configuration for a whole simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of nodes
    pub population_size: usize,

    /// Relative initial weights for `[Yes, No]`; need not sum to 1
    pub weights: [f64; 2],

    /// Protocol parameters
    pub snowball: SnowballConfig,

    /// Round cap
    pub max_rounds: u64,

    /// Seed for the run's random stream; entropy when absent
    pub seed: Option<u64>,

    /// Within-round update order
    pub update_order: UpdateOrder,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            weights: [0.55, 0.45],
            snowball: SnowballConfig::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
            update_order: UpdateOrder::Ascending,
        }
    }
}

impl SimulationConfig {
    /// Check everything that does not depend on a random draw
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_weights(&self.weights)?;
        self.snowball.validate_for_population(self.population_size)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Weights must be finite, non-negative and not both zero
pub(crate) fn validate_weights(weights: &[f64; 2]) -> std::result::Result<(), ConfigError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigError::invalid_weights(format!(
            "weights must be finite and non-negative, got {:?}",
            weights
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigError::invalid_weights("weights must not all be zero"));
    }
    Ok(())
}
