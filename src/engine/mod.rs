//! Game-theoretic engine for resource coverage games.
//!
//! This module analyzes games in which each player claims one resource from
//! a fixed pool and the group's welfare is a set function of the claimed
//! resources, such as the area covered by a union of circles.
//!
//! # Overview
//!
//! Given a [`Valuation`] and a pool, the engine computes:
//! 1. Each player's marginal contribution and Shapley value
//! 2. The optimal k-subset of the pool, exactly or greedily
//! 3. Whether an assignment is a pure Nash equilibrium under a utility rule
//! 4. The worst equilibrium and the resulting Price of Anarchy
//!
//! # Usage
//!
//! ```ignore
//! use coverage_game_solver::engine::{AnalysisConfig, Assignment, PoaAnalyzer, PoolGame};
//!
//! let game = PoolGame::new(my_valuation, my_pool);
//! let analyzer = PoaAnalyzer::new(game, AnalysisConfig::default())?;
//!
//! let assignment = Assignment::new(vec![0, 3, 5], 3, analyzer.game().pool_size())?;
//! let report = analyzer.analyze_assignment(&assignment)?;
//! println!("Shapley values: {:?}", report.shapley_values);
//! ```
//!
//! # Cost
//!
//! The exact routines are exponential: the optimum needs `C(|pool|, k)`
//! valuations, Shapley values `2^n`, and the worst-equilibrium search
//! `C(|pool|, k)` equilibrium checks of `k * |pool|` utilities each. Pools
//! of about 15 regions with `k <= 5` stay interactive. Longer searches can
//! be bounded with a deadline or cancelled through an [`Interrupt`].
//!
//! # Theory
//!
//! **Shapley value**: average marginal contribution over all arrival orders.
//! ```text
//! phi_i = sum_{C ⊆ N \ {i}} |C|! (n - |C| - 1)! / n! * (v(C ∪ {i}) - v(C))
//! ```
//!
//! **Price of Anarchy**: optimal welfare over the welfare of the worst
//! equilibrium; at least 1.
//!
//! **Greedy guarantee**: for monotone submodular `v` the greedy k-subset is
//! within `1 - 1/e` of the optimum.
//!
//! # References
//!
//! - Shapley, L. S. "A Value for n-Person Games" (1953)
//! - Vetta, A. "Nash Equilibria in Competitive Societies, with Applications to
//!   Facility Location, Traffic Routing and Auctions" (2002)
//! - Nemhauser, G., Wolsey, L., Fisher, M. "An analysis of approximations for
//!   maximizing submodular set functions" (1978)

pub mod cache;
pub mod config;
pub mod equilibrium;
pub mod error;
pub mod game;
pub mod interrupt;
pub mod optimizer;
pub mod poa;
pub mod shapley;
pub mod subsets;
pub mod valuation;

// Re-export main types for convenient access
pub use cache::{CacheStats, ValueCache};
pub use config::{AnalysisConfig, ConfigError, DEFAULT_EXACT_POOL_LIMIT};
pub use equilibrium::{
    DeviationScope, Equilibria, EquilibriumChecker, MarginalUtility, RuleKind, ShapleyUtility,
    UtilityRule, WorstEquilibrium,
};
pub use error::{GameError, Result};
pub use game::{others_of, Assignment, PoolGame};
pub use interrupt::Interrupt;
pub use optimizer::{greedy, optimal, OptimumMethod, Selection};
pub use poa::{ChosenAssignmentPoa, GameReport, PoaAnalyzer, PoaOutcome};
pub use shapley::{shapley_value_of_candidate, shapley_values, MAX_SHAPLEY_PLAYERS};
pub use valuation::{Resource, Valuation};
