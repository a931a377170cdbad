//! Per-node protocol state

use crate::vote::Vote;
use serde::{Deserialize, Serialize};

/// One node's Snowball state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnowballState {
    /// Current opinion
    pub preference: Vote,

    /// Consecutive polls whose quorum agreed with the preference held at sampling time
    pub consecutive_success: usize,

    /// Irreversible decision, once reached
    pub decision: Option<Vote>,
}

impl SnowballState {
    /// Fresh state with a zeroed counter and no decision
    pub fn new(preference: Vote) -> Self {
        Self {
            preference,
            consecutive_success: 0,
            decision: None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }
}
