//! Index-addressed node collections

use crate::{
    config::validate_weights,
    error::ConfigError,
    state::SnowballState,
    vote::{Vote, VoteTally},
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// All nodes of a run. A node's index is its identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Population {
    nodes: Vec<SnowballState>,
}

impl Population {
    /// Draw `size` initial preferences from relative `[yes, no]` weights.
    ///
    /// One draw per node, in ascending index order.
    pub fn with_weights<R: Rng + ?Sized>(
        size: usize,
        weights: [f64; 2],
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        validate_weights(&weights)?;
        let dist = WeightedIndex::new(weights)
            .map_err(|e| ConfigError::invalid_weights(e.to_string()))?;
        let nodes = (0..size)
            .map(|_| SnowballState::new(Vote::ALL[dist.sample(rng)]))
            .collect();
        Ok(Self { nodes })
    }

    /// Build from explicit starting preferences
    pub fn from_preferences<I: IntoIterator<Item = Vote>>(preferences: I) -> Self {
        Self {
            nodes: preferences.into_iter().map(SnowballState::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SnowballState] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnowballState> {
        self.nodes.iter()
    }

    /// Indices of nodes without a decision, ascending
    pub fn undecided(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_decided())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn all_decided(&self) -> bool {
        self.nodes.iter().all(SnowballState::is_decided)
    }

    /// Counts of current preferences
    pub fn tally(&self) -> VoteTally {
        self.nodes.iter().map(|n| n.preference).collect()
    }

    /// Counts of reached decisions
    pub fn decision_tally(&self) -> VoteTally {
        self.nodes.iter().filter_map(|n| n.decision).collect()
    }

    pub fn into_nodes(self) -> Vec<SnowballState> {
        self.nodes
    }
}

impl From<Vec<SnowballState>> for Population {
    fn from(nodes: Vec<SnowballState>) -> Self {
        Self { nodes }
    }
}

impl Index<usize> for Population {
    type Output = SnowballState;

    fn index(&self, id: usize) -> &SnowballState {
        &self.nodes[id]
    }
}

impl IndexMut<usize> for Population {
    fn index_mut(&mut self, id: usize) -> &mut SnowballState {
        &mut self.nodes[id]
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a SnowballState;
    type IntoIter = std::slice::Iter<'a, SnowballState>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn weighted_init_is_zeroed_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        let population = Population::with_weights(50, [0.5, 0.5], &mut rng).unwrap();
        assert_eq!(population.len(), 50);
        assert!(population
            .iter()
            .all(|n| n.consecutive_success == 0 && n.decision.is_none()));
        assert_eq!(population.tally().total(), 50);
    }

    #[test]
    fn degenerate_weights_pick_one_side() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_yes = Population::with_weights(20, [3.0, 0.0], &mut rng).unwrap();
        assert_eq!(all_yes.tally().yes, 20);
        let all_no = Population::with_weights(20, [0.0, 1.0], &mut rng).unwrap();
        assert_eq!(all_no.tally().no, 20);
    }

    #[test]
    fn weights_are_relative() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        let scaled = Population::with_weights(100, [60.0, 40.0], &mut a).unwrap();
        let unit = Population::with_weights(100, [0.6, 0.4], &mut b).unwrap();
        assert_eq!(scaled, unit);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Population::with_weights(10, [0.0, 0.0], &mut rng),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn undecided_lists_ascending_indices() {
        let mut population = Population::from_preferences([Vote::Yes, Vote::No, Vote::Yes]);
        population[1].decision = Some(Vote::No);
        assert_eq!(population.undecided(), vec![0, 2]);
        assert!(!population.all_decided());
        assert_eq!(population.decision_tally(), VoteTally { yes: 0, no: 1 });
    }
}
