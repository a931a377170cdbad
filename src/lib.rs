//! Snowball - a simulator for leaderless binary consensus
//!
//! A population of nodes, each holding a [`Vote`], repeatedly polls random
//! peers and updates its preference and confidence counter until every node
//! has irreversibly decided or a round cap is hit. This is the non-Byzantine
//! Snowball protocol from the Avalanche family, run in a single process.

// Modules
pub mod config;
pub mod consensus;
pub mod error;
pub mod population;
pub mod sampler;
pub mod simulation;
pub mod state;
pub mod vote;

// Re-exports
pub use config::{SimulationConfig, SnowballConfig, UpdateOrder};
pub use consensus::{update, Consensus, PollOutcome};
pub use error::{ConfigError, Result, SnowballError};
pub use population::Population;
pub use sampler::{sample_indices, Sampler, UniformSampler};
pub use simulation::{
    History, Simulation, SimulationBuilder, SimulationOutcome, SimulationReport, SimulationStatus,
    Snapshot,
};
pub use state::SnowballState;
pub use vote::{Vote, VoteTally};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
