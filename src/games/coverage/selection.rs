//! Interactive choice of regions before analysis.

use serde::{Deserialize, Serialize};

use super::circle::{Circle, Point};
use crate::engine::error::Result;
use crate::engine::game::Assignment;

/// Regions picked so far, in the order they were picked.
///
/// Picking a region that is already selected removes it again. Once the
/// players are done, [`SelectionState::finalize`] turns the picks into an
/// immutable [`Assignment`], where pick order is player order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected: Vec<usize>,
}

impl SelectionState {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle pool index `index`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.selected.iter().position(|&i| i == index) {
            Some(pos) => {
                self.selected.remove(pos);
                false
            }
            None => {
                self.selected.push(index);
                true
            }
        }
    }

    /// Toggle the first circle in pool order that contains `point`.
    ///
    /// Returns the toggled index, or `None` if the point hits no circle.
    pub fn toggle_at(&mut self, point: Point, pool: &[Circle]) -> Option<usize> {
        let index = pool.iter().position(|c| c.contains(point))?;
        self.toggle(index);
        Some(index)
    }

    /// Selected pool indices in pick order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Number of selected regions.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Drop every pick.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Snapshot the picks as an assignment for `num_players` players.
    pub fn finalize(&self, num_players: usize, pool_size: usize) -> Result<Assignment> {
        Assignment::new(self.selected.clone(), num_players, pool_size)
    }
}
