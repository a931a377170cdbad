//! Peer sampling

use crate::{state::SnowballState, vote::Vote};
use rand::seq::index;
use rand::Rng;

/// Draws the votes a node sees in one poll
pub trait Sampler {
    /// Return exactly `k` preferences of nodes other than `requester`.
    ///
    /// Callers guarantee `k < population.len()`.
    fn sample<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        population: &[SnowballState],
        requester: usize,
        k: usize,
    ) -> Vec<Vote>;
}

/// Uniform sampling without replacement over every node but the requester
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn sample<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        population: &[SnowballState],
        requester: usize,
        k: usize,
    ) -> Vec<Vote> {
        sample_indices(rng, population.len(), requester, k)
            .into_iter()
            .map(|id| population[id].preference)
            .collect()
    }
}

/// Pick `k` distinct node indices from `0..n`, excluding `requester`.
///
/// Draws `k + 1` indices from the full range, drops the requester if it was
/// drawn, then keeps the first `k`. Every `k`-subset of the other `n - 1`
/// nodes is equally likely. Requires `k < n`.
pub fn sample_indices<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    requester: usize,
    k: usize,
) -> Vec<usize> {
    index::sample(rng, n, k + 1)
        .into_iter()
        .filter(|&id| id != requester)
        .take(k)
        .collect()
}
