//! Configuration options for the analysis engine.
//!
//! This module provides the settings that control how a [`PoaAnalyzer`]
//! searches: when to fall back from the exact optimum to the greedy one,
//! which deviations a player may consider, and how much time and how many
//! threads a search may use.
//!
//! [`PoaAnalyzer`]: crate::engine::PoaAnalyzer

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::equilibrium::DeviationScope;

/// Pool size above which the exact optimum is replaced by the greedy one.
pub const DEFAULT_EXACT_POOL_LIMIT: usize = 20;

/// Configuration for the analyzer.
///
/// # Example
/// ```
/// use coverage_game_solver::engine::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.exact_pool_limit, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest pool for which the optimum is computed by brute force.
    ///
    /// Larger pools use the greedy approximation and skip the worst-case
    /// equilibrium search.
    pub exact_pool_limit: usize,

    /// Which regions a player may switch to when best-responding.
    pub deviation_scope: DeviationScope,

    /// Number of threads for parallel enumeration.
    ///
    /// `None` uses the global rayon pool.
    pub num_threads: Option<usize>,

    /// Wall-clock budget for a single worst-equilibrium search, in seconds.
    pub deadline_secs: Option<f64>,

    /// Memoize valuations by pool-index set.
    pub use_cache: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exact_pool_limit: DEFAULT_EXACT_POOL_LIMIT,
            deviation_scope: DeviationScope::FullPool,
            num_threads: None,
            deadline_secs: None,
            use_cache: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the exact/greedy threshold.
    pub fn with_exact_pool_limit(mut self, limit: usize) -> Self {
        self.exact_pool_limit = limit;
        self
    }

    /// Builder method: set the deviation scope.
    pub fn with_deviation_scope(mut self, scope: DeviationScope) -> Self {
        self.deviation_scope = scope;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set the search deadline.
    pub fn with_deadline_secs(mut self, secs: f64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    /// Builder method: enable or disable the value cache.
    pub fn with_cache(mut self, enable: bool) -> Self {
        self.use_cache = enable;
        self
    }

    /// Deadline as a [`Duration`], if one is set.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secs) = self.deadline_secs {
            if !secs.is_finite() || secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::InvalidDeadline(secs));
            }
        }
        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Deadline is not a positive number of seconds.
    #[error("deadline {0} is not a positive number of seconds")]
    InvalidDeadline(f64),
    /// Thread count of zero.
    #[error("thread count must be at least 1")]
    InvalidThreads,
    /// Radius range is empty or non-positive.
    #[error("radius range [{0}, {1}) is empty or non-positive")]
    InvalidRadiusRange(f64, f64),
    /// Board cannot contain the largest circle.
    #[error("board {0}x{1} cannot hold a circle of radius {2}")]
    BoardTooSmall(f64, f64, f64),
    /// Resource welfare table has the wrong shape.
    #[error("invalid welfare table: {0}")]
    InvalidTable(String),
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(String),
    /// File is not valid JSON for this config.
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deviation_scope, DeviationScope::FullPool);
        assert!(config.deadline().is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = AnalysisConfig::new().with_deadline_secs(-1.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDeadline(-1.0)));

        let config = AnalysisConfig::new().with_threads(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreads));
    }

    #[test]
    fn test_rejects_unrepresentable_deadline() {
        let config = AnalysisConfig::new().with_deadline_secs(1e20);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDeadline(1e20)));
        assert_eq!(config.deadline(), None);

        let err = AnalysisConfig::from_json_str(r#"{"deadline_secs": 1e20}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDeadline(1e20));

        let config = AnalysisConfig::new().with_deadline_secs(2.5);
        assert_eq!(config.deadline(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            AnalysisConfig::from_json_str(r#"{"exact_pool_limit": 12, "deviation_scope": "unclaimed"}"#)
                .unwrap();
        assert_eq!(config.exact_pool_limit, 12);
        assert_eq!(config.deviation_scope, DeviationScope::Unclaimed);
        assert!(config.use_cache);

        let err = AnalysisConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
