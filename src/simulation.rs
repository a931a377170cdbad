//! Round-driven population simulation
//!
//! A [`Simulation`] owns the population and the run's single random stream.
//! Each call to [`Simulation::step`] snapshots the current state and, unless
//! the run has reached a terminal state, updates every undecided node once.
//!
//! Updates within a round are sequential: a node sampled later in a round
//! sees whatever its peers changed to earlier in the same round. The update
//! order is therefore part of the dynamics and is fixed by [`UpdateOrder`].
//!
//! # Usage
//!
//! ```
//! use snowball_sim::{Simulation, SimulationOutcome};
//!
//! let report = Simulation::builder()
//!     .population_size(100)
//!     .weights(0.9, 0.1)
//!     .sample_size(10)
//!     .quorum_size(8)
//!     .decision_threshold(5)
//!     .max_rounds(500)
//!     .seed(42)
//!     .build()
//!     .unwrap()
//!     .run();
//!
//! assert!(matches!(report.outcome, SimulationOutcome::Converged { .. }));
//! ```

use crate::{
    config::{SimulationConfig, SnowballConfig, UpdateOrder},
    consensus::{update, PollOutcome},
    error::{ConfigError, Result},
    population::Population,
    sampler::{Sampler, UniformSampler},
    state::SnowballState,
    vote::{Vote, VoteTally},
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use tracing::{debug, info};

/// Copy of every node's state at a round boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of update rounds applied before this snapshot was taken
    pub round: u64,
    pub nodes: Vec<SnowballState>,
}

impl Snapshot {
    /// Counts of current preferences
    pub fn tally(&self) -> VoteTally {
        self.nodes.iter().map(|n| n.preference).collect()
    }

    /// Counts of reached decisions
    pub fn decision_tally(&self) -> VoteTally {
        self.nodes.iter().filter_map(|n| n.decision).collect()
    }

    pub fn decided_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_decided()).count()
    }

    pub fn all_decided(&self) -> bool {
        self.nodes.iter().all(SnowballState::is_decided)
    }
}

/// Ordered snapshots of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Preference counts per snapshot, the yes/no time series
    pub fn tallies(&self) -> Vec<VoteTally> {
        self.snapshots.iter().map(Snapshot::tally).collect()
    }

    /// Round at which `node` first shows a decision, if it ever does
    pub fn decided_at(&self, node: usize) -> Option<u64> {
        self.snapshots
            .iter()
            .find(|s| s.nodes.get(node).is_some_and(SnowballState::is_decided))
            .map(|s| s.round)
    }
}

impl FromIterator<Snapshot> for History {
    fn from_iter<I: IntoIterator<Item = Snapshot>>(iter: I) -> Self {
        Self {
            snapshots: iter.into_iter().collect(),
        }
    }
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SimulationOutcome {
    /// Every node decided
    Converged { rounds: u64 },
    /// Round cap reached with undecided nodes left
    Exhausted { rounds: u64, undecided: usize },
}

impl SimulationOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SimulationOutcome::Converged { .. })
    }

    /// Update rounds applied before the run ended
    pub fn rounds(&self) -> u64 {
        match self {
            SimulationOutcome::Converged { rounds } => *rounds,
            SimulationOutcome::Exhausted { rounds, .. } => *rounds,
        }
    }
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Running,
    Finished(SimulationOutcome),
}

/// Result of driving a run to completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub outcome: SimulationOutcome,
    pub history: History,
}

impl SimulationReport {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    /// The common decision, when every node decided the same way
    pub fn unanimous_decision(&self) -> Option<Vote> {
        let last = self.final_snapshot()?;
        let first = last.nodes.first()?.decision?;
        last.nodes
            .iter()
            .all(|n| n.decision == Some(first))
            .then_some(first)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A single Snowball run
#[derive(Debug)]
pub struct Simulation<R: Rng = StdRng, S: Sampler = UniformSampler> {
    config: SnowballConfig,
    population: Population,
    sampler: S,
    rng: R,
    round: u64,
    max_rounds: u64,
    order: UpdateOrder,
    status: SimulationStatus,
}

impl<R: Rng> Simulation<R, UniformSampler> {
    /// Create a run over `population` with uniform peer sampling
    pub fn new(
        population: Population,
        config: SnowballConfig,
        max_rounds: u64,
        rng: R,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_sampler(population, config, max_rounds, rng, UniformSampler)
    }
}

impl Simulation {
    /// Create a builder for a seeded or entropy-backed run
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }
}

impl<R: Rng, S: Sampler> Simulation<R, S> {
    /// Create a run with a custom sampler
    pub fn with_sampler(
        population: Population,
        config: SnowballConfig,
        max_rounds: u64,
        rng: R,
        sampler: S,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate_for_population(population.len())?;
        info!(
            n = population.len(),
            k = config.sample_size(),
            alpha = config.quorum_size(),
            beta = config.decision_threshold(),
            max_rounds,
            "starting snowball simulation"
        );
        Ok(Self {
            config,
            population,
            sampler,
            rng,
            round: 0,
            max_rounds,
            order: UpdateOrder::Ascending,
            status: SimulationStatus::Running,
        })
    }

    /// Set the within-round update order
    pub fn with_update_order(mut self, order: UpdateOrder) -> Self {
        self.order = order;
        self
    }

    /// Advance one round.
    ///
    /// Returns the pre-round snapshot, or `None` once the run has finished.
    /// The last snapshot returned shows the terminal state.
    pub fn step(&mut self) -> Option<Snapshot> {
        if self.status != SimulationStatus::Running {
            return None;
        }

        let snapshot = Snapshot {
            round: self.round,
            nodes: self.population.nodes().to_vec(),
        };
        debug!(
            round = self.round,
            tally = %self.population.tally(),
            decided = snapshot.decided_count(),
            "round"
        );

        if self.population.all_decided() {
            self.finish(SimulationOutcome::Converged { rounds: self.round });
        } else if self.round >= self.max_rounds {
            let undecided = self.population.undecided().len();
            self.finish(SimulationOutcome::Exhausted {
                rounds: self.round,
                undecided,
            });
        } else {
            self.run_round();
            self.round += 1;
        }

        Some(snapshot)
    }

    fn run_round(&mut self) {
        let mut pending = self.population.undecided();
        if self.order == UpdateOrder::Shuffled {
            pending.shuffle(&mut self.rng);
        }

        let k = self.config.sample_size();
        for id in pending {
            let sampled = self
                .sampler
                .sample(&mut self.rng, self.population.nodes(), id, k);
            let outcome = update(&mut self.population[id], &sampled, &self.config);
            debug_assert_ne!(outcome, PollOutcome::Frozen);
        }
    }

    fn finish(&mut self, outcome: SimulationOutcome) {
        info!(?outcome, "snowball simulation finished");
        self.status = SimulationStatus::Finished(outcome);
    }

    /// Drive the run to completion, collecting every snapshot
    pub fn run(mut self) -> SimulationReport {
        let history: History = self.by_ref().collect();
        let outcome = match self.status {
            SimulationStatus::Finished(outcome) => outcome,
            // Unreachable: the iterator only stops once finished
            SimulationStatus::Running => SimulationOutcome::Exhausted {
                rounds: self.round,
                undecided: self.population.undecided().len(),
            },
        };
        SimulationReport { outcome, history }
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    /// Terminal outcome, once the run has finished
    pub fn outcome(&self) -> Option<SimulationOutcome> {
        match self.status {
            SimulationStatus::Finished(outcome) => Some(outcome),
            SimulationStatus::Running => None,
        }
    }

    /// Update rounds applied so far
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn max_rounds(&self) -> u64 {
        self.max_rounds
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &SnowballConfig {
        &self.config
    }

    pub fn update_order(&self) -> UpdateOrder {
        self.order
    }
}

impl<R: Rng, S: Sampler> Iterator for Simulation<R, S> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        self.step()
    }
}

impl<R: Rng, S: Sampler> FusedIterator for Simulation<R, S> {}

/// Builder for seeded simulations
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    sample_size: Option<usize>,
    quorum_size: Option<usize>,
    decision_threshold: Option<usize>,
}

impl SimulationBuilder {
    /// Create a builder starting from [`SimulationConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete run configuration
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self.sample_size = None;
        self.quorum_size = None;
        self.decision_threshold = None;
        self
    }

    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Relative initial weights for yes and no
    pub fn weights(mut self, yes: f64, no: f64) -> Self {
        self.config.weights = [yes, no];
        self
    }

    pub fn sample_size(mut self, k: usize) -> Self {
        self.sample_size = Some(k);
        self
    }

    pub fn quorum_size(mut self, alpha: usize) -> Self {
        self.quorum_size = Some(alpha);
        self
    }

    pub fn decision_threshold(mut self, beta: usize) -> Self {
        self.decision_threshold = Some(beta);
        self
    }

    pub fn max_rounds(mut self, max_rounds: u64) -> Self {
        self.config.max_rounds = max_rounds;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn update_order(mut self, order: UpdateOrder) -> Self {
        self.config.update_order = order;
        self
    }

    /// Resolve the run configuration without building
    pub fn config(&self) -> std::result::Result<SimulationConfig, ConfigError> {
        let base = self.config.snowball;
        let overridden = self.sample_size.is_some()
            || self.quorum_size.is_some()
            || self.decision_threshold.is_some();
        let snowball = if overridden {
            SnowballConfig::new(
                self.sample_size.unwrap_or(base.sample_size()),
                self.quorum_size.unwrap_or(base.quorum_size()),
                self.decision_threshold.unwrap_or(base.decision_threshold()),
            )?
        } else {
            base
        };
        let config = SimulationConfig {
            snowball,
            ..self.config.clone()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate, draw the initial population and build the run
    pub fn build(self) -> Result<Simulation<StdRng>> {
        let config = self.config()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = Population::with_weights(config.population_size, config.weights, &mut rng)?;
        let simulation = Simulation::new(population, config.snowball, config.max_rounds, rng)?
            .with_update_order(config.update_order);
        Ok(simulation)
    }
}
