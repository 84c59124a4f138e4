//! Exact and greedy maximization of a valuation over k-subsets of the pool.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::error::{GameError, Result};
use crate::engine::game::PoolGame;
use crate::engine::subsets::{binomial, unrank_combination};
use crate::engine::valuation::Valuation;

/// How a [`Selection`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimumMethod {
    /// Brute force over every k-subset.
    Exact,
    /// Greedy marginal-gain approximation.
    Greedy,
}

/// A chosen set of pool indices and its welfare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Chosen pool indices, in the order they were selected.
    pub indices: Vec<usize>,
    /// Value of the chosen set.
    pub welfare: f64,
    /// Whether the selection is the exact optimum.
    pub method: OptimumMethod,
}

fn check_size(pool_size: usize, k: usize) -> Result<()> {
    if k > pool_size {
        return Err(GameError::SubsetTooLarge { k, pool_size });
    }
    Ok(())
}

/// Best k-subset of the pool by brute force.
///
/// Every subset is evaluated; ties go to the first subset in lexicographic
/// order of pool indices. Subsets are scored in parallel by rank and the
/// reduction keeps the lowest rank among equal values, so the answer does
/// not depend on scheduling.
///
/// Cost is `C(|pool|, k)` valuations. Callers bound the pool size.
pub fn optimal<V: Valuation>(game: &PoolGame<V>, k: usize) -> Result<Selection> {
    let n = game.pool_size();
    check_size(n, k)?;
    let count = binomial(n, k).ok_or(GameError::SubsetTooLarge { k, pool_size: n })?;

    let (best_rank, welfare) = (0..count)
        .into_par_iter()
        .map(|rank| (rank, game.value_of(&unrank_combination(n, k, rank))))
        .reduce(
            || (usize::MAX, f64::NEG_INFINITY),
            |a, b| {
                if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
                    b
                } else {
                    a
                }
            },
        );

    debug!("exact optimum over {} subsets: rank {} welfare {:.4}", count, best_rank, welfare);

    Ok(Selection {
        indices: unrank_combination(n, k, best_rank),
        welfare,
        method: OptimumMethod::Exact,
    })
}

/// Greedy approximation of the best k-subset.
///
/// Starting from the empty set, adds the unchosen region with the largest
/// marginal gain, k times, without backtracking. The scan runs in pool
/// order and replaces the running best whenever a gain is `>=` it, so among
/// equal gains the last one scanned is picked.
///
/// On monotone submodular valuations the result is within `1 - 1/e` of
/// the optimum.
pub fn greedy<V: Valuation>(game: &PoolGame<V>, k: usize) -> Result<Selection> {
    let n = game.pool_size();
    check_size(n, k)?;

    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    let mut current = game.value_of(&chosen);

    for _ in 0..k {
        let mut best_gain = f64::NEG_INFINITY;
        let mut pick = None;
        let mut candidate_set = chosen.clone();

        for index in 0..n {
            if chosen.contains(&index) {
                continue;
            }
            candidate_set.push(index);
            let gain = game.value_of(&candidate_set) - current;
            candidate_set.pop();

            if gain >= best_gain {
                best_gain = gain;
                pick = Some(index);
            }
        }

        // k <= n guarantees an unchosen index exists.
        let Some(index) = pick else { break };
        chosen.push(index);
        current += best_gain;
        debug!("greedy pick {} (gain {:.4})", index, best_gain);
    }

    Ok(Selection {
        welfare: game.value_of(&chosen),
        indices: chosen,
        method: OptimumMethod::Greedy,
    })
}
