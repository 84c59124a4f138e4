//! # Coverage Game Solver
//!
//! Shapley values, pure Nash equilibria and the Price of Anarchy for
//! coalitional coverage games: players each claim one region from a fixed
//! pool, and the group is worth the area of the union of what it claimed.
//!
//! ## Features
//!
//! - **Generic Engine**: Works with any set function implementing `Valuation`
//! - **Exact and Greedy Optima**: Brute force over k-subsets, or the
//!   `1 - 1/e` greedy approximation
//! - **Shapley Values**: Exact coalition enumeration with factorial weights
//! - **Equilibria**: Best-response checks under marginal or Shapley utility
//! - **Price of Anarchy**: Worst-case equilibrium search with a deadline hook
//!
//! ## Quick Start
//!
//! ```ignore
//! use coverage_game_solver::engine::{AnalysisConfig, Assignment, PoaAnalyzer, PoolGame};
//! use coverage_game_solver::games::coverage::{CoverageValuation, PoolConfig};
//!
//! // 1. Build a pool of circles
//! let pool = PoolConfig::default().with_seed(7).generate()?;
//!
//! // 2. Create an analyzer
//! let analyzer = PoaAnalyzer::new(PoolGame::new(CoverageValuation, pool), AnalysisConfig::default())?;
//!
//! // 3. Analyze the players' choices
//! let assignment = Assignment::new(vec![0, 2, 4], 3, 6)?;
//! let report = analyzer.analyze_assignment(&assignment)?;
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: Valuation abstraction, optimizer, Shapley values, equilibria
//! - [`games`]: Concrete valuations (circle coverage, route resource tables)
//! - [`setup`]: Logger installation for binaries
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PoaAnalyzer (Generic)                      │
//! │  - Optimum (exact/greedy)   - Worst equilibrium per rule        │
//! │  - Shapley values           - Price of Anarchy                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Valuation trait
//!                               ▼
//!              ┌────────────────┴────────────────┐
//!              │                                 │
//!              ▼                                 ▼
//!       ┌─────────────┐                   ┌─────────────┐
//!       │   Circle    │                   │    Route    │
//!       │  Coverage   │                   │  Resources  │
//!       └─────────────┘                   └─────────────┘
//! ```

#![warn(missing_docs)]

/// Game-theoretic engine.
///
/// This is the core module containing the generic analysis algorithms.
pub mod engine;

/// Valuation implementations module.
///
/// Contains the circle coverage game and the route resource game.
pub mod games;

/// Logging setup shared by the binaries.
pub mod setup;

// Re-export commonly used types at crate root for convenience
pub use engine::{
    AnalysisConfig, Assignment, GameError, GameReport, PoaAnalyzer, PoolGame, RuleKind, Valuation,
};
