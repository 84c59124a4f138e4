//! Route resource game.
//!
//! Players pick routes through a small network. Each link (resource) has a
//! welfare row indexed by how many players use it, and the welfare of a set
//! of routes is the sum over links of `table[link][usage]`. Usage beyond
//! the last column is clamped to it.
//!
//! ## Classic Network
//!
//! ```text
//!        A ──────── D
//!        │        ╱ │
//!        │      ╱   │
//!        B ───╱──── C      links: AD, CB, AB, BD, CD
//! ```
//!
//! | link | 0 | 1 | 2 | 3+ |
//! |------|---|---|---|----|
//! | AD   | 0 | 5 | 1 | 10 |
//! | CB   | 0 | 1 | 4 | 6  |
//! | AB   | 0 | 1 | 2 | 4  |
//! | BD   | 0 | 1 | 2 | 4  |
//! | CD   | 0 | 1 | 2 | 4  |
//!
//! Rows need not be monotone, so unlike circle coverage a player can have a
//! negative marginal contribution.

use serde::{Deserialize, Serialize};

use crate::engine::config::ConfigError;
use crate::engine::valuation::Valuation;

/// A route: the links it uses, by row index into the welfare table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Link indices, each used once.
    pub links: Vec<usize>,
}

impl Route {
    /// Create a route over `links`. Repeated links count once.
    pub fn new(mut links: Vec<usize>) -> Self {
        links.sort_unstable();
        links.dedup();
        Self { links }
    }
}

/// Welfare as a sum of per-link tables over link usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteValuation {
    link_names: Vec<String>,
    table: Vec<Vec<f64>>,
}

impl RouteValuation {
    /// Create a valuation, checking the table shape.
    ///
    /// Every row needs the same non-zero length and a zero first column so
    /// that no routes produce no welfare.
    pub fn new(link_names: Vec<String>, table: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let valuation = Self { link_names, table };
        valuation.validate()?;
        Ok(valuation)
    }

    /// The five-link network above.
    pub fn classic() -> Self {
        let names = ["AD", "CB", "AB", "BD", "CD"];
        Self {
            link_names: names.iter().map(|s| s.to_string()).collect(),
            table: vec![
                vec![0.0, 5.0, 1.0, 10.0],
                vec![0.0, 1.0, 4.0, 6.0],
                vec![0.0, 1.0, 2.0, 4.0],
                vec![0.0, 1.0, 2.0, 4.0],
                vec![0.0, 1.0, 2.0, 4.0],
            ],
        }
    }

    /// Parse from JSON, `{"link_names": [...], "table": [[...], ...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let valuation: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        valuation.validate()?;
        Ok(valuation)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table.len() != self.link_names.len() {
            return Err(ConfigError::InvalidTable(format!(
                "{} rows for {} links",
                self.table.len(),
                self.link_names.len()
            )));
        }
        let columns = self.table.first().map_or(1, Vec::len);
        for (name, row) in self.link_names.iter().zip(&self.table) {
            if row.len() != columns || columns == 0 {
                return Err(ConfigError::InvalidTable(format!(
                    "row {} has {} columns, expected {}",
                    name,
                    row.len(),
                    columns
                )));
            }
            if row[0] != 0.0 {
                return Err(ConfigError::InvalidTable(format!(
                    "row {} is worth {} with no users",
                    name, row[0]
                )));
            }
        }
        Ok(())
    }

    /// Link names, in row order.
    pub fn link_names(&self) -> &[String] {
        &self.link_names
    }

    /// Build a route from link names; `None` if a name is unknown.
    pub fn route(&self, names: &[&str]) -> Option<Route> {
        let links = names
            .iter()
            .map(|name| self.link_names.iter().position(|n| n == name))
            .collect::<Option<Vec<usize>>>()?;
        Some(Route::new(links))
    }

    /// Display form of a route, links joined by `-`.
    pub fn describe(&self, route: &Route) -> String {
        route
            .links
            .iter()
            .map(|&l| self.link_names.get(l).map_or("?", String::as_str))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// How many of `routes` use each link.
    pub fn usage(&self, routes: &[Route]) -> Vec<usize> {
        let mut usage = vec![0usize; self.table.len()];
        for route in routes {
            for &link in &route.links {
                if let Some(count) = usage.get_mut(link) {
                    *count += 1;
                }
            }
        }
        usage
    }
}

impl Valuation for RouteValuation {
    type Item = Route;

    /// Links outside the table are ignored.
    fn value(&self, items: &[Route]) -> f64 {
        self.usage(items)
            .into_iter()
            .zip(&self.table)
            .map(|(count, row)| {
                let column = count.min(row.len().saturating_sub(1));
                row.get(column).copied().unwrap_or(0.0)
            })
            .sum()
    }

    fn name(&self) -> &str {
        "route"
    }
}
