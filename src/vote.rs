//! Binary preference domain

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node's binary preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
}

impl Vote {
    /// Both values, in a fixed order
    pub const ALL: [Vote; 2] = [Vote::Yes, Vote::No];

    /// The opposite preference. `flip` is its own inverse.
    pub const fn flip(self) -> Self {
        match self {
            Vote::Yes => Vote::No,
            Vote::No => Vote::Yes,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Yes => write!(f, "yes"),
            Vote::No => write!(f, "no"),
        }
    }
}

/// Per-value counts over a collection of votes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: usize,
    pub no: usize,
}

impl VoteTally {
    /// Record one vote
    pub fn add(&mut self, vote: Vote) {
        match vote {
            Vote::Yes => self.yes += 1,
            Vote::No => self.no += 1,
        }
    }

    /// Count for a single value
    pub fn count(&self, vote: Vote) -> usize {
        match vote {
            Vote::Yes => self.yes,
            Vote::No => self.no,
        }
    }

    pub fn total(&self) -> usize {
        self.yes + self.no
    }

    /// The strictly larger side, if any
    pub fn majority(&self) -> Option<Vote> {
        match self.yes.cmp(&self.no) {
            std::cmp::Ordering::Greater => Some(Vote::Yes),
            std::cmp::Ordering::Less => Some(Vote::No),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl FromIterator<Vote> for VoteTally {
    fn from_iter<I: IntoIterator<Item = Vote>>(iter: I) -> Self {
        let mut tally = VoteTally::default();
        for vote in iter {
            tally.add(vote);
        }
        tally
    }
}

impl fmt::Display for VoteTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "yes={} no={}", self.yes, self.no)
    }
}
