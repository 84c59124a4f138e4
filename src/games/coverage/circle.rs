//! Circles on a rectangular board, and random pool generation.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::config::ConfigError;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A circular region. Compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the disc.
    pub center: Point,
    /// Radius, positive.
    pub radius: f64,
}

impl Circle {
    /// Create a circle centered at `(x, y)`.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
        }
    }

    /// Area of the disc.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Whether `point` lies in the closed disc.
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance(&point) <= self.radius
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}) r={:.2}",
            self.center.x, self.center.y, self.radius
        )
    }
}

/// Parameters for a random pool of circles.
///
/// # Example
/// ```
/// use coverage_game_solver::games::coverage::PoolConfig;
///
/// let pool = PoolConfig::default().with_seed(42).generate().unwrap();
/// assert_eq!(pool.len(), 6);
/// assert!(pool.iter().all(|c| c.radius >= 1.0 && c.radius < 3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of circles.
    pub num_regions: usize,
    /// Radius drawn uniformly from `[min, max)`.
    pub radius_range: (f64, f64),
    /// Board `(width, height)`; every circle lies inside it.
    pub board_size: (f64, f64),
    /// Random seed (`None` draws from entropy).
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_regions: 6,
            radius_range: (1.0, 3.0),
            board_size: (10.0, 10.0),
            seed: None,
        }
    }
}

impl PoolConfig {
    /// Set the number of circles.
    pub fn with_regions(mut self, num_regions: usize) -> Self {
        self.num_regions = num_regions;
        self
    }

    /// Set the radius range.
    pub fn with_radius_range(mut self, min: f64, max: f64) -> Self {
        self.radius_range = (min, max);
        self
    }

    /// Set the board size.
    pub fn with_board_size(mut self, width: f64, height: f64) -> Self {
        self.board_size = (width, height);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the board can hold the largest circle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = self.radius_range;
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(ConfigError::InvalidRadiusRange(min, max));
        }
        let (width, height) = self.board_size;
        if !(2.0 * max <= width && 2.0 * max <= height) {
            return Err(ConfigError::BoardTooSmall(width, height, max));
        }
        Ok(())
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Seeded generator for this config.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Validate and generate a pool with this config's own RNG.
    pub fn generate(&self) -> Result<Vec<Circle>, ConfigError> {
        random_pool(self, &mut self.rng())
    }
}

/// Draw `config.num_regions` circles that fit inside the board.
pub fn random_pool<R: Rng>(config: &PoolConfig, rng: &mut R) -> Result<Vec<Circle>, ConfigError> {
    config.validate()?;
    let (min, max) = config.radius_range;
    let (width, height) = config.board_size;

    let pool = (0..config.num_regions)
        .map(|_| {
            let radius = if min < max { rng.gen_range(min..max) } else { min };
            let x = rng.gen_range(radius..=width - radius);
            let y = rng.gen_range(radius..=height - radius);
            Circle::new(x, y, radius)
        })
        .collect();
    Ok(pool)
}
