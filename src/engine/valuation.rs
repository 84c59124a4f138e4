//! Valuation trait definition for the game engine.
//!
//! Any set function that implements [`Valuation`] can be analyzed by the
//! engine. This keeps the combinatorial algorithms independent of geometry
//! or any other way of scoring a set of resources.

use std::fmt::Debug;

/// Trait for resources that players can claim.
///
/// Resources are compared by value: an assignment holds copies of pool
/// entries, so two entries with the same shape count as the same resource.
pub trait Resource: Clone + PartialEq + Debug + Send + Sync {}

impl<T: Clone + PartialEq + Debug + Send + Sync> Resource for T {}

/// A set function scoring the welfare of a collection of resources.
///
/// Implementations must be pure: the same input always produces the same
/// output, and `value(&[])` is zero. The engine evaluates valuations from
/// many threads at once.
///
/// # Example
/// ```
/// use coverage_game_solver::engine::Valuation;
///
/// struct Count;
///
/// impl Valuation for Count {
///     type Item = u32;
///
///     fn value(&self, items: &[u32]) -> f64 {
///         items.len() as f64
///     }
/// }
///
/// assert_eq!(Count.value(&[1, 2, 3]), 3.0);
/// ```
pub trait Valuation: Send + Sync {
    /// The resource type held by a player.
    type Item: Resource;

    /// Welfare produced by `items` together.
    fn value(&self, items: &[Self::Item]) -> f64;

    /// Short name used in logs and reports.
    fn name(&self) -> &str {
        "valuation"
    }
}

impl<V: Valuation + ?Sized> Valuation for &V {
    type Item = V::Item;

    fn value(&self, items: &[Self::Item]) -> f64 {
        (**self).value(items)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
