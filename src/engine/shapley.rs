//! Exact Shapley values by coalition enumeration.
//!
//! For `n` players the Shapley value of player `i` is
//!
//! ```text
//! phi_i = sum over C ⊆ N \ {i} of  |C|! (n - |C| - 1)! / n!  * (v(C ∪ {i}) - v(C))
//! ```
//!
//! The weight is the probability that a uniformly random arrival order puts
//! exactly the members of `C` before `i`. Coalitions are bitmasks over
//! player positions; every coalition value is computed once and shared
//! between players, so a full run costs `2^n` valuations.

use rayon::prelude::*;

use crate::engine::error::{GameError, Result};
use crate::engine::game::PoolGame;
use crate::engine::valuation::Valuation;

/// Largest player count accepted by exact enumeration.
pub const MAX_SHAPLEY_PLAYERS: usize = 24;

/// `weights[s] = s! (n - s - 1)! / n!` for `s` in `0..n`.
///
/// Computed as a running product to stay accurate for large `n`.
pub fn coalition_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    // weights[0] = (n-1)!/n! = 1/n; weights[s+1] = weights[s] * (s+1) / (n-s-1).
    let mut weights = Vec::with_capacity(n);
    let mut w = 1.0 / n as f64;
    for s in 0..n {
        weights.push(w);
        if s + 1 < n {
            w *= (s + 1) as f64 / (n - s - 1) as f64;
        }
    }
    weights
}

fn check_players(players: usize) -> Result<()> {
    if players > MAX_SHAPLEY_PLAYERS {
        return Err(GameError::TooManyPlayers {
            players,
            limit: MAX_SHAPLEY_PLAYERS,
        });
    }
    Ok(())
}

/// Shapley value of every player in `assignment`.
///
/// `assignment[i]` is the pool index held by player `i`; the result is in
/// the same order. The values sum to the welfare of the whole assignment.
pub fn shapley_values<V: Valuation>(game: &PoolGame<V>, assignment: &[usize]) -> Result<Vec<f64>> {
    let n = assignment.len();
    check_players(n)?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let coalitions = 1usize << n;
    let values: Vec<f64> = (0..coalitions)
        .into_par_iter()
        .map(|mask| game.coalition_value(assignment, mask as u64))
        .collect();
    let weights = coalition_weights(n);

    let shapley = (0..n)
        .into_par_iter()
        .map(|player| {
            let bit = 1usize << player;
            (0..coalitions)
                .filter(|mask| mask & bit == 0)
                .map(|mask| {
                    let size = mask.count_ones() as usize;
                    weights[size] * (values[mask | bit] - values[mask])
                })
                .sum::<f64>()
        })
        .collect();

    Ok(shapley)
}

/// Shapley value of `candidate` joining the players holding `existing`.
///
/// The candidate is treated as player `m + 1` of a game whose other players
/// hold `existing`; only coalitions of existing members are enumerated
/// (`2^m` of them). Used to rank unchosen regions by their worth to a group.
pub fn shapley_value_of_candidate<V: Valuation>(
    game: &PoolGame<V>,
    candidate: usize,
    existing: &[usize],
) -> Result<f64> {
    let m = existing.len();
    check_players(m + 1)?;

    let weights = coalition_weights(m + 1);
    let mut members = Vec::with_capacity(m + 1);
    let mut total = 0.0;

    for mask in 0..1u64 << m {
        members.clear();
        members.extend(crate::engine::subsets::mask_members(mask).map(|i| existing[i]));
        let without = game.value_of(&members);
        members.push(candidate);
        let with = game.value_of(&members);
        total += weights[mask.count_ones() as usize] * (with - without);
    }

    Ok(total)
}
