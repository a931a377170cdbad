//! The Snowball update rule

use crate::{config::SnowballConfig, state::SnowballState, vote::Vote};
use tracing::trace;

/// What a single poll did to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Quorum agreed with the preference; counter incremented
    Reinforced,
    /// Quorum disagreed; preference flipped and counter set to 1
    Flipped,
    /// Neither side reached quorum; counter reset to 0
    NoQuorum,
    /// Node had already decided; nothing changed
    Frozen,
}

/// Base trait for per-node binary consensus state machines
pub trait Consensus {
    /// Apply one poll result
    fn record_poll(&mut self, sampled: &[Vote], config: &SnowballConfig) -> PollOutcome;

    /// Current preference
    fn preference(&self) -> Vote;

    /// Finalized value, if any
    fn decision(&self) -> Option<Vote>;

    fn is_decided(&self) -> bool {
        self.decision().is_some()
    }
}

impl Consensus for SnowballState {
    fn record_poll(&mut self, sampled: &[Vote], config: &SnowballConfig) -> PollOutcome {
        update(self, sampled, config)
    }

    fn preference(&self) -> Vote {
        self.preference
    }

    fn decision(&self) -> Option<Vote> {
        self.decision
    }
}

/// Apply one sample to a node.
///
/// Agreement is checked before disagreement, so when `2α ≤ k` and both
/// sides reach quorum the node reinforces. The decision test is strict: a
/// node decides once its counter exceeds `β`, i.e. on its `(β+1)`-th
/// consecutive success. Decided nodes are left untouched.
pub fn update(state: &mut SnowballState, sampled: &[Vote], config: &SnowballConfig) -> PollOutcome {
    if state.decision.is_some() {
        return PollOutcome::Frozen;
    }

    let agree = sampled.iter().filter(|&&v| v == state.preference).count();
    let disagree = sampled.len() - agree;

    let outcome = if agree >= config.quorum_size() {
        state.consecutive_success += 1;
        PollOutcome::Reinforced
    } else if disagree >= config.quorum_size() {
        state.consecutive_success = 1;
        state.preference = state.preference.flip();
        trace!(preference = %state.preference, "preference flipped");
        PollOutcome::Flipped
    } else {
        state.consecutive_success = 0;
        PollOutcome::NoQuorum
    };

    if state.consecutive_success > config.decision_threshold() {
        state.decision = Some(state.preference);
        trace!(decision = %state.preference, "node decided");
    }

    outcome
}
