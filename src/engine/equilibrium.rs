//! Pure Nash equilibrium checks under pluggable player utilities.
//!
//! A player's utility for holding a region is decided by a [`UtilityRule`]
//! evaluated against the regions of the *other* players. An assignment is
//! an equilibrium when every player already holds their best response.
//!
//! # Deviation scope
//!
//! With [`DeviationScope::FullPool`] a best response is searched over the
//! whole pool, including regions other players hold. This is the default.
//! With [`DeviationScope::Unclaimed`] regions held by other players are not
//! candidates, so a player can only switch to a free resource.

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::error::{GameError, Result};
use crate::engine::game::{others_of, PoolGame};
use crate::engine::interrupt::Interrupt;
use crate::engine::shapley::shapley_value_of_candidate;
use crate::engine::subsets::{binomial, unrank_combination, Combinations};
use crate::engine::valuation::Valuation;

/// How a player values holding `candidate` next to `others`.
pub trait UtilityRule: Send + Sync {
    /// Name used in logs, errors and reports.
    fn name(&self) -> &'static str;

    /// Utility of adding pool entry `candidate` to the regions `others`.
    fn utility<V: Valuation>(&self, game: &PoolGame<V>, candidate: usize, others: &[usize])
        -> Result<f64>;
}

/// Utility is the area a region adds to what the others already cover.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginalUtility;

impl UtilityRule for MarginalUtility {
    fn name(&self) -> &'static str {
        "marginal"
    }

    fn utility<V: Valuation>(&self, game: &PoolGame<V>, candidate: usize, others: &[usize]) -> Result<f64> {
        let mut with = others.to_vec();
        with.push(candidate);
        Ok(game.value_of(&with) - game.value_of(others))
    }
}

/// Utility is the region's Shapley value as a newcomer to the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapleyUtility;

impl UtilityRule for ShapleyUtility {
    fn name(&self) -> &'static str {
        "shapley"
    }

    fn utility<V: Valuation>(&self, game: &PoolGame<V>, candidate: usize, others: &[usize]) -> Result<f64> {
        shapley_value_of_candidate(game, candidate, others)
    }
}

/// Serializable choice between the built-in utility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// [`MarginalUtility`].
    Marginal,
    /// [`ShapleyUtility`].
    Shapley,
}

impl RuleKind {
    /// Both rules, marginal first.
    pub const ALL: [RuleKind; 2] = [RuleKind::Marginal, RuleKind::Shapley];
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl UtilityRule for RuleKind {
    fn name(&self) -> &'static str {
        match self {
            RuleKind::Marginal => MarginalUtility.name(),
            RuleKind::Shapley => ShapleyUtility.name(),
        }
    }

    fn utility<V: Valuation>(&self, game: &PoolGame<V>, candidate: usize, others: &[usize]) -> Result<f64> {
        match self {
            RuleKind::Marginal => MarginalUtility.utility(game, candidate, others),
            RuleKind::Shapley => ShapleyUtility.utility(game, candidate, others),
        }
    }
}

/// Which regions a deviating player may switch to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationScope {
    /// Every pool region, including those held by other players.
    #[default]
    FullPool,
    /// Only regions no other player holds.
    Unclaimed,
}

/// The lowest-welfare equilibrium of a given size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstEquilibrium {
    /// Pool indices of the equilibrium, ascending.
    pub indices: Vec<usize>,
    /// Its welfare.
    pub welfare: f64,
    /// How many k-subsets are equilibria.
    pub equilibria_found: usize,
    /// How many k-subsets were checked.
    pub subsets_checked: usize,
}

/// Checks assignments for pure Nash equilibrium under one utility rule.
#[derive(Debug, Clone)]
pub struct EquilibriumChecker<'a, V: Valuation, R: UtilityRule> {
    game: &'a PoolGame<V>,
    rule: R,
    scope: DeviationScope,
}

impl<'a, V: Valuation, R: UtilityRule> EquilibriumChecker<'a, V, R> {
    /// Checker over `game` with full-pool deviations.
    pub fn new(game: &'a PoolGame<V>, rule: R) -> Self {
        Self {
            game,
            rule,
            scope: DeviationScope::default(),
        }
    }

    /// Builder method: set the deviation scope.
    pub fn with_scope(mut self, scope: DeviationScope) -> Self {
        self.scope = scope;
        self
    }

    /// The utility rule in use.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Best region for `player` given everyone else's choices.
    ///
    /// Scans candidates in pool order, keeping the greatest utility seen so
    /// far and replacing it on `>=`. Returns `None` only when no candidate
    /// exists.
    pub fn best_response(&self, assignment: &[usize], player: usize) -> Result<Option<usize>> {
        let others = others_of(assignment, player);
        let mut best = f64::NEG_INFINITY;
        let mut pick = None;

        for candidate in 0..self.game.pool_size() {
            if self.scope == DeviationScope::Unclaimed && others.contains(&candidate) {
                continue;
            }
            let utility = self.rule.utility(self.game, candidate, &others)?;
            if utility >= best {
                best = utility;
                pick = Some(candidate);
            }
        }

        Ok(pick)
    }

    /// Whether no player wants to switch regions.
    ///
    /// A player is satisfied when their best response is equal by value to
    /// the region they hold.
    pub fn is_nash_equilibrium(&self, assignment: &[usize]) -> Result<bool> {
        for (player, &held) in assignment.iter().enumerate() {
            match self.best_response(assignment, player)? {
                Some(best) if self.game.same_resource(best, held) => {}
                best => {
                    debug!(
                        "{:?} not an equilibrium under {}: player {} holds {} but prefers {:?}",
                        assignment,
                        self.rule.name(),
                        player,
                        held,
                        best
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Lazily yield every k-subset that is an equilibrium, in lexicographic order.
    pub fn equilibria(&self, k: usize) -> Equilibria<'_, 'a, V, R> {
        Equilibria {
            checker: self,
            subsets: Combinations::new(self.game.pool_size(), k),
        }
    }

    /// The equilibrium of size `k` with minimum welfare, if any exists.
    ///
    /// Every k-subset is checked in parallel; among equal welfare the
    /// lexicographically first subset is reported. `interrupt` is polled
    /// once per subset.
    pub fn worst_equilibrium(&self, k: usize, interrupt: &Interrupt) -> Result<Option<WorstEquilibrium>> {
        let n = self.game.pool_size();
        if k > n {
            return Err(GameError::SubsetTooLarge { k, pool_size: n });
        }
        let count = binomial(n, k).ok_or(GameError::SubsetTooLarge { k, pool_size: n })?;

        // (lowest welfare equilibrium as (rank, welfare), number of equilibria)
        type Partial = (Option<(usize, f64)>, usize);

        let (worst, found): Partial = (0..count)
            .into_par_iter()
            .map(|rank| -> Result<Partial> {
                interrupt.check()?;
                let subset = unrank_combination(n, k, rank);
                if self.is_nash_equilibrium(&subset)? {
                    Ok((Some((rank, self.game.value_of(&subset))), 1))
                } else {
                    Ok((None, 0))
                }
            })
            .try_reduce(
                || (None, 0),
                |a, b| {
                    let worst = match (a.0, b.0) {
                        (Some(x), Some(y)) => {
                            if y.1 < x.1 || (y.1 == x.1 && y.0 < x.0) {
                                Some(y)
                            } else {
                                Some(x)
                            }
                        }
                        (x, None) => x,
                        (None, y) => y,
                    };
                    Ok((worst, a.1 + b.1))
                },
            )?;

        info!(
            "{} rule, k={}: {} of {} subsets are equilibria",
            self.rule.name(),
            k,
            found,
            count
        );

        Ok(worst.map(|(rank, welfare)| WorstEquilibrium {
            indices: unrank_combination(n, k, rank),
            welfare,
            equilibria_found: found,
            subsets_checked: count,
        }))
    }

    /// Welfare of the worst equilibrium of size `k`, or `+inf` if there is none.
    pub fn worst_equilibrium_welfare(&self, k: usize, interrupt: &Interrupt) -> Result<f64> {
        Ok(self
            .worst_equilibrium(k, interrupt)?
            .map_or(f64::INFINITY, |worst| worst.welfare))
    }
}

/// Iterator over the equilibria of one size, from [`EquilibriumChecker::equilibria`].
pub struct Equilibria<'c, 'a, V: Valuation, R: UtilityRule> {
    checker: &'c EquilibriumChecker<'a, V, R>,
    subsets: Combinations,
}

impl<V: Valuation, R: UtilityRule> Iterator for Equilibria<'_, '_, V, R> {
    type Item = Result<Vec<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        for subset in self.subsets.by_ref() {
            match self.checker.is_nash_equilibrium(&subset) {
                Ok(true) => return Some(Ok(subset)),
                Ok(false) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Disjoint resources worth their own weight, no overlap at all.
    struct Additive;

    impl Valuation for Additive {
        type Item = f64;

        fn value(&self, items: &[f64]) -> f64 {
            items.iter().sum()
        }
    }

    fn additive_game() -> PoolGame<Additive> {
        PoolGame::new(Additive, vec![1.0, 4.0, 9.0, 16.0])
    }

    #[test]
    fn test_best_response_marginal() {
        let game = additive_game();
        let checker = EquilibriumChecker::new(&game, MarginalUtility);
        // Player 0 faces {9}: 9 itself adds nothing, 16 adds the most.
        assert_eq!(checker.best_response(&[0, 2], 0).unwrap(), Some(3));
        assert_eq!(checker.best_response(&[3, 2], 1).unwrap(), Some(2));
    }

    #[test]
    fn test_marginal_equilibrium_is_the_optimum() {
        let game = additive_game();
        let checker = EquilibriumChecker::new(&game, MarginalUtility);
        assert!(checker.is_nash_equilibrium(&[2, 3]).unwrap());
        assert!(!checker.is_nash_equilibrium(&[0, 3]).unwrap());

        let all: Vec<Vec<usize>> = checker.equilibria(2).collect::<Result<_>>().unwrap();
        assert_eq!(all, vec![vec![2, 3]]);

        let worst = checker.worst_equilibrium(2, &Interrupt::new()).unwrap().unwrap();
        assert_eq!(worst.indices, vec![2, 3]);
        assert_eq!(worst.welfare, 25.0);
        assert_eq!(worst.equilibria_found, 1);
        assert_eq!(worst.subsets_checked, 6);
    }

    #[test]
    fn test_rules_disagree() {
        let game = PoolGame::new(Additive, vec![1.0, 10.0, 2.0]);
        let marginal = EquilibriumChecker::new(&game, MarginalUtility);
        assert!(marginal.is_nash_equilibrium(&[1, 2]).unwrap());

        // Under Shapley utility re-picking the other player's region is worth
        // half of it, which beats holding the small one.
        let shapley = EquilibriumChecker::new(&game, ShapleyUtility);
        assert_eq!(shapley.best_response(&[1, 2], 1).unwrap(), Some(1));
        assert!(!shapley.is_nash_equilibrium(&[1, 2]).unwrap());
        assert!(shapley.worst_equilibrium(2, &Interrupt::new()).unwrap().is_none());
        assert_eq!(
            shapley.worst_equilibrium_welfare(2, &Interrupt::new()).unwrap(),
            f64::INFINITY
        );

        // Restricting deviations to free regions restores the equilibrium.
        let shapley = shapley.with_scope(DeviationScope::Unclaimed);
        assert!(shapley.is_nash_equilibrium(&[1, 2]).unwrap());
        assert!(!shapley.is_nash_equilibrium(&[0, 1]).unwrap());
    }

    #[test]
    fn test_single_player_wants_the_largest() {
        let game = additive_game();
        for rule in RuleKind::ALL {
            let checker = EquilibriumChecker::new(&game, rule);
            let worst = checker.worst_equilibrium(1, &Interrupt::new()).unwrap().unwrap();
            assert_eq!(worst.indices, vec![3], "{rule}");
        }
    }

    #[test]
    fn test_equal_regions_satisfy_each_other() {
        // Pool entries 1 and 2 are equal by value; the >= scan prefers 2.
        let game = PoolGame::new(Additive, vec![1.0, 5.0, 5.0]);
        let checker = EquilibriumChecker::new(&game, MarginalUtility);
        assert_eq!(checker.best_response(&[1], 0).unwrap(), Some(2));
        assert!(checker.is_nash_equilibrium(&[1]).unwrap());
    }

    #[test]
    fn test_interrupt_stops_search() {
        let game = additive_game();
        let checker = EquilibriumChecker::new(&game, MarginalUtility);
        let interrupt = Interrupt::new();
        interrupt.cancel();
        assert_eq!(
            checker.worst_equilibrium(2, &interrupt),
            Err(GameError::Cancelled)
        );
    }

    #[test]
    fn test_rule_kind_serde() {
        let json = serde_json::to_string(&RuleKind::Shapley).unwrap();
        assert_eq!(json, "\"shapley\"");
        let scope: DeviationScope = serde_json::from_str("\"full_pool\"").unwrap();
        assert_eq!(scope, DeviationScope::FullPool);
    }
}
