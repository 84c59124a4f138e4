//! A valuation bound to a fixed pool of resources.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::engine::cache::{CacheStats, ValueCache, MAX_CACHED_POOL};
use crate::engine::error::{GameError, Result};
use crate::engine::valuation::Valuation;

/// Player choices as pool indices: `choices[i]` is the region held by player `i`.
///
/// Construction checks the player count, index range and that no pool index
/// is held twice. Two different indices may still hold resources that are
/// equal by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    choices: Vec<usize>,
}

impl Assignment {
    /// Validate `choices` for a game of `num_players` over a pool of `pool_size`.
    pub fn new(choices: Vec<usize>, num_players: usize, pool_size: usize) -> Result<Self> {
        if choices.len() != num_players {
            return Err(GameError::AssignmentSize {
                expected: num_players,
                actual: choices.len(),
            });
        }
        for (i, &index) in choices.iter().enumerate() {
            if index >= pool_size {
                return Err(GameError::RegionOutOfRange { index, pool_size });
            }
            if choices[..i].contains(&index) {
                return Err(GameError::DuplicateChoice { index });
            }
        }
        Ok(Self { choices })
    }

    /// Pool index held by each player.
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.choices.len()
    }
}

/// A valuation together with the immutable pool players choose from.
///
/// All engine operations address resources by pool index. Set values are
/// memoized per index set when the pool fits a bitmask.
#[derive(Debug, Clone)]
pub struct PoolGame<V: Valuation> {
    valuation: V,
    pool: Vec<V::Item>,
    cache: Option<ValueCache>,
}

impl<V: Valuation> PoolGame<V> {
    /// Create a game with memoization enabled.
    pub fn new(valuation: V, pool: Vec<V::Item>) -> Self {
        Self::with_cache(valuation, pool, true)
    }

    /// Create a game, choosing whether set values are memoized.
    ///
    /// Pools larger than 64 entries are never memoized.
    pub fn with_cache(valuation: V, pool: Vec<V::Item>, use_cache: bool) -> Self {
        let cache = (use_cache && pool.len() <= MAX_CACHED_POOL).then(ValueCache::new);
        Self {
            valuation,
            pool,
            cache,
        }
    }

    /// The underlying valuation.
    pub fn valuation(&self) -> &V {
        &self.valuation
    }

    /// The resource pool.
    pub fn pool(&self) -> &[V::Item] {
        &self.pool
    }

    /// Number of resources in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Whether two pool entries hold equal resources.
    pub fn same_resource(&self, a: usize, b: usize) -> bool {
        self.pool[a] == self.pool[b]
    }

    /// Value of the set of pool entries at `indices`.
    ///
    /// Indices are treated as a set: order and repeats do not matter.
    pub fn value_of(&self, indices: &[usize]) -> f64 {
        match &self.cache {
            Some(cache) => {
                let mask = indices.iter().fold(0u64, |mask, &i| mask | (1u64 << i));
                cache.get_or_insert_with(mask, || self.evaluate_mask(mask))
            }
            None => {
                let mut unique = indices.to_vec();
                unique.sort_unstable();
                unique.dedup();
                self.evaluate(&unique)
            }
        }
    }

    /// Value of a coalition of players, given as a bitmask over `assignment`.
    pub fn coalition_value(&self, assignment: &[usize], coalition: u64) -> f64 {
        let members: Vec<usize> = crate::engine::subsets::mask_members(coalition)
            .map(|player| assignment[player])
            .collect();
        self.value_of(&members)
    }

    /// Social welfare of an assignment: the value of all chosen resources.
    pub fn social_welfare(&self, assignment: &[usize]) -> f64 {
        self.value_of(assignment)
    }

    /// Marginal contribution of each player to the welfare of the others.
    ///
    /// `contributions[i] = value(all) - value(all except player i)`.
    pub fn contributions(&self, assignment: &[usize]) -> Vec<f64> {
        let with_all = self.value_of(assignment);
        (0..assignment.len())
            .map(|player| {
                let others = others_of(assignment, player);
                with_all - self.value_of(&others)
            })
            .collect()
    }

    /// Cache counters, if memoization is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ValueCache::stats)
    }

    fn evaluate_mask(&self, mask: u64) -> f64 {
        let indices: Vec<usize> = crate::engine::subsets::mask_members(mask).collect();
        self.evaluate(&indices)
    }

    fn evaluate(&self, indices: &[usize]) -> f64 {
        let items: Vec<V::Item> = indices.iter().map(|&i| self.pool[i].clone()).collect();
        let value = self.valuation.value(&items);
        trace!("{} of {:?} = {}", self.valuation.name(), indices, value);
        value
    }
}

/// The choices of every player except `player`.
pub fn others_of(assignment: &[usize], player: usize) -> Vec<usize> {
    assignment
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != player)
        .map(|(_, &index)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts distinct letters covered by a set of words.
    struct Letters;

    impl Valuation for Letters {
        type Item = &'static str;

        fn value(&self, items: &[&'static str]) -> f64 {
            let mut letters: Vec<char> = items.iter().flat_map(|w| w.chars()).collect();
            letters.sort_unstable();
            letters.dedup();
            letters.len() as f64
        }
    }

    fn game(use_cache: bool) -> PoolGame<Letters> {
        PoolGame::with_cache(Letters, vec!["ab", "bc", "cd", "xy"], use_cache)
    }

    #[test]
    fn test_assignment_validation() {
        assert!(Assignment::new(vec![0, 2], 2, 4).is_ok());
        assert_eq!(
            Assignment::new(vec![0], 2, 4),
            Err(GameError::AssignmentSize {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            Assignment::new(vec![0, 4], 2, 4),
            Err(GameError::RegionOutOfRange {
                index: 4,
                pool_size: 4
            })
        );
        assert_eq!(
            Assignment::new(vec![1, 1], 2, 4),
            Err(GameError::DuplicateChoice { index: 1 })
        );
    }

    #[test]
    fn test_value_is_a_set_function() {
        for use_cache in [true, false] {
            let game = game(use_cache);
            assert_eq!(game.value_of(&[]), 0.0);
            assert_eq!(game.value_of(&[0, 1]), 3.0);
            assert_eq!(game.value_of(&[1, 0, 1]), 3.0);
        }
    }

    #[test]
    fn test_contributions_and_welfare() {
        let game = game(true);
        let assignment = [0, 1, 3];
        assert_eq!(game.social_welfare(&assignment), 5.0);
        // "ab" adds a, "bc" adds c, "xy" adds both of its letters.
        assert_eq!(game.contributions(&assignment), vec![1.0, 1.0, 2.0]);
        assert_eq!(game.coalition_value(&assignment, 0b101), 4.0);

        let stats = game.cache_stats().unwrap();
        assert!(stats.hits > 0);
    }

    #[test]
    fn test_others_of() {
        assert_eq!(others_of(&[4, 7, 9], 1), vec![4, 9]);
        assert!(others_of(&[4], 0).is_empty());
    }
}
