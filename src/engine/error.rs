//! Error types for the game engine.

use thiserror::Error;

use crate::engine::config::ConfigError;

/// Errors raised by the analysis routines.
///
/// Combinatorial blow-up is surfaced through [`GameError::TooManyPlayers`],
/// [`GameError::Cancelled`] and [`GameError::DeadlineExceeded`] instead of
/// letting a search run unbounded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Number of chosen regions differs from the declared player count.
    #[error("assignment has {actual} choices but the game declares {expected} players")]
    AssignmentSize {
        /// Declared player count.
        expected: usize,
        /// Number of choices supplied.
        actual: usize,
    },

    /// A choice points outside the region pool.
    #[error("region index {index} is outside the pool of {pool_size} regions")]
    RegionOutOfRange {
        /// Offending pool index.
        index: usize,
        /// Size of the pool.
        pool_size: usize,
    },

    /// The same pool index was chosen by two players.
    #[error("region {index} was chosen by more than one player")]
    DuplicateChoice {
        /// Pool index chosen twice.
        index: usize,
    },

    /// Requested subset size is larger than the pool.
    #[error("cannot choose {k} regions from a pool of {pool_size}")]
    SubsetTooLarge {
        /// Requested subset size.
        k: usize,
        /// Size of the pool.
        pool_size: usize,
    },

    /// Exact Shapley enumeration would need more than `2^limit` coalitions.
    #[error("{players} players exceed the exact Shapley limit of {limit}")]
    TooManyPlayers {
        /// Number of players requested.
        players: usize,
        /// Largest supported player count.
        limit: usize,
    },

    /// No subset of size `k` is a Nash equilibrium under the rule.
    #[error("no Nash equilibrium of size {k} under {rule} utility")]
    NoEquilibrium {
        /// Subset size searched.
        k: usize,
        /// Name of the utility rule.
        rule: String,
    },

    /// The worst equilibrium covers nothing, so the ratio is undefined.
    #[error("price of anarchy is undefined: worst equilibrium welfare is zero")]
    ZeroWelfare,

    /// The search was cancelled through its [`Interrupt`](crate::engine::Interrupt).
    #[error("search was cancelled")]
    Cancelled,

    /// The search ran past its deadline.
    #[error("search exceeded its deadline after {elapsed_secs:.2}s")]
    DeadlineExceeded {
        /// Seconds spent before giving up.
        elapsed_secs: f64,
    },

    /// The dedicated rayon pool could not be built.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, GameError>;
