//! Circle coverage game.
//!
//! A pool of circles is laid out on a rectangular board. Each player claims
//! one circle, and a group of players is worth the area covered by the union
//! of their circles. Overlap is what makes the game interesting: a player
//! whose circle sits inside the others' contributes nothing at the margin,
//! yet still earns a share of the Shapley value.
//!
//! ## Properties
//!
//! - `value(∅) = 0`
//! - Monotone: adding a circle never shrinks the covered area
//! - Submodular: a circle adds less to a larger group
//!
//! Submodularity is what gives greedy selection its `1 - 1/e` guarantee and
//! bounds the Price of Anarchy under marginal-contribution utility.
//!
//! ## Example
//!
//! ```
//! use coverage_game_solver::engine::{shapley_values, PoolGame};
//! use coverage_game_solver::games::coverage::{Circle, CoverageValuation};
//!
//! let pool = vec![Circle::new(1.0, 1.0, 1.0), Circle::new(1.0, 1.0, 1.0)];
//! let game = PoolGame::new(CoverageValuation, pool);
//!
//! // Same circle twice: the area is shared equally.
//! let phi = shapley_values(&game, &[0, 1]).unwrap();
//! assert!((phi[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! ```

mod circle;
mod selection;
mod union;

pub use circle::{random_pool, Circle, Point, PoolConfig};
pub use selection::SelectionState;
pub use union::union_area;

use crate::engine::valuation::Valuation;

/// Area of the union of the claimed circles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageValuation;

impl Valuation for CoverageValuation {
    type Item = Circle;

    fn value(&self, items: &[Circle]) -> f64 {
        union_area(items)
    }

    fn name(&self) -> &str {
        "coverage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        greedy, optimal, shapley_values, AnalysisConfig, Assignment, EquilibriumChecker,
        GameError, PoaAnalyzer, PoolGame, RuleKind,
    };
    use crate::engine::subsets::Combinations;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{E, PI};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn random_game(regions: usize, seed: u64) -> PoolGame<CoverageValuation> {
        let pool = PoolConfig::default()
            .with_regions(regions)
            .with_seed(seed)
            .generate()
            .unwrap();
        PoolGame::new(CoverageValuation, pool)
    }

    #[test]
    fn test_disjoint_circles() {
        let pool = vec![
            Circle::new(0.0, 0.0, 1.0),
            Circle::new(3.0, 0.0, 1.0),
            Circle::new(6.0, 0.0, 1.0),
        ];
        let game = PoolGame::new(CoverageValuation, pool);
        let choices = [0, 1, 2];

        assert!(close(game.social_welfare(&choices), 3.0 * PI));
        for c in game.contributions(&choices) {
            assert!(close(c, PI));
        }
        for phi in shapley_values(&game, &choices).unwrap() {
            assert!(close(phi, PI));
        }
    }

    #[test]
    fn test_identical_circles_share_area() {
        let circle = Circle::new(4.0, 4.0, 1.0);
        let game = PoolGame::new(CoverageValuation, vec![circle, circle]);
        let choices = [0, 1];

        assert!(close(game.social_welfare(&choices), PI));
        assert_eq!(game.contributions(&choices)[1], 0.0);
        let phi = shapley_values(&game, &choices).unwrap();
        assert!(close(phi[0], PI / 2.0));
        assert!(close(phi[1], PI / 2.0));

        // Distinct indices are fine even though the circles are equal.
        assert!(Assignment::new(vec![0, 1], 2, 2).is_ok());
        assert_eq!(
            Assignment::new(vec![1, 1], 2, 2),
            Err(GameError::DuplicateChoice { index: 1 })
        );
    }

    #[test]
    fn test_value_is_monotone_and_submodular() {
        let mut rng = StdRng::seed_from_u64(17);
        for seed in 0..20 {
            let game = random_game(8, seed);
            let mut order: Vec<usize> = (0..8).collect();
            order.shuffle(&mut rng);

            let split = rng.gen_range(0..7);
            let larger = &order[..7];
            let smaller = &larger[..split];
            let extra = order[7];

            let with = |set: &[usize]| {
                let mut s = set.to_vec();
                s.push(extra);
                game.value_of(&s)
            };
            let gain_small = with(smaller) - game.value_of(smaller);
            let gain_large = with(larger) - game.value_of(larger);

            assert!(game.value_of(larger) + 1e-9 >= game.value_of(smaller));
            assert!(gain_small >= -1e-9);
            assert!(gain_small + 1e-9 >= gain_large, "seed {}", seed);
        }
    }

    #[test]
    fn test_shapley_efficiency_on_random_pools() {
        for seed in 0..5 {
            let game = random_game(8, seed);
            let choices: Vec<usize> = (0..8).collect();
            let total: f64 = shapley_values(&game, &choices).unwrap().iter().sum();
            assert!(close(total, game.social_welfare(&choices)), "seed {}", seed);
        }
    }

    #[test]
    fn test_greedy_guarantee() {
        for seed in 0..10 {
            let game = random_game(9, 100 + seed);
            for k in 1..=4 {
                let best = optimal(&game, k).unwrap();
                let approx = greedy(&game, k).unwrap();
                assert!(approx.welfare <= best.welfare + 1e-9);
                assert!(approx.welfare >= (1.0 - 1.0 / E) * best.welfare - 1e-9);
            }
        }
    }

    #[test]
    fn test_three_players_ten_regions() {
        let game = random_game(10, 2024);
        let best = optimal(&game, 3).unwrap();
        for subset in Combinations::new(10, 3) {
            assert!(best.welfare + 1e-9 >= game.value_of(&subset));
        }

        let analyzer = PoaAnalyzer::new(game, AnalysisConfig::default()).unwrap();
        for rule in RuleKind::ALL {
            match analyzer.price_of_anarchy(3, rule) {
                Ok(poa) => assert!(poa >= 1.0 - 1e-12, "{} PoA {}", rule, poa),
                Err(GameError::NoEquilibrium { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
    }

    #[test]
    fn test_marginal_equilibrium_always_exists() {
        // Marginal utility makes the game a potential game with the
        // welfare as potential, so the optimum is an equilibrium.
        let game = random_game(7, 9);
        let best = optimal(&game, 3).unwrap();
        let checker = EquilibriumChecker::new(&game, RuleKind::Marginal);
        let found = checker.equilibria(3).count();
        assert!(found >= 1);
        let mut sorted = best.indices.clone();
        sorted.sort_unstable();
        assert!(checker.is_nash_equilibrium(&sorted).unwrap());
    }
}
