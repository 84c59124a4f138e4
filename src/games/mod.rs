//! Valuations the engine can analyze.
//!
//! Each game supplies a resource type and a [`Valuation`] over sets of those
//! resources; everything else (optima, Shapley values, equilibria, Price of
//! Anarchy) comes from the generic engine.
//!
//! ## Available Games
//!
//! - [`coverage`]: Circles on a board, worth the area of their union
//! - [`route`]: Routes through a network, worth a per-link usage table
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define the resource type (it must be `Clone + PartialEq + Debug`)
//! 3. Implement the `Valuation` trait
//! 4. Add tests for the set-function properties the game relies on
//!
//! [`Valuation`]: crate::engine::Valuation

pub mod coverage;
pub mod route;
