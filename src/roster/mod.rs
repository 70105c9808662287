//! Point-budgeted roster: the ordered selection of units and its running total.
//!
//! `total` always equals the sum of the selected units' points. A selection whose sum
//! does not fit a `u32` is refused rather than clamped. A successful [RosterManager::add] never leaves the roster over the
//! budget passed to it. Lowering the budget afterwards does not trim the roster; use
//! [RosterManager::is_over_budget] to report that state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Unit;

pub mod export;
pub mod store;

pub use export::{CsvExporter, ExportAdapter, ExportError, TextExporter};
pub use store::{FileStore, MemoryStore, RosterStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("adding '{name}' ({points} pts) would bring the roster to {would_be} pts, over the {budget} pt budget")]
    BudgetExceeded {
        name: String,
        points: u32,
        would_be: u64,
        budget: u32,
    },
    #[error("no roster entry at index {index} (roster has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("roster points add up to {sum}, beyond the largest representable total")]
    TotalOverflow { sum: u64 },
}

/// Owned, serializable view of the roster for rendering, export and persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub units: Vec<Unit>,
    pub total_points: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterManager {
    selected: Vec<Unit>,
    total: u32,
}

/// Exact sum of `points`; `Err` carries the sum when it does not fit a `u32`.
pub(crate) fn sum_points(units: &[Unit]) -> Result<u32, u64> {
    let sum: u64 = units.iter().map(|unit| u64::from(unit.points)).sum();
    u32::try_from(sum).map_err(|_| sum)
}

impl RosterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster restored from previously selected units. The total is recomputed.
    pub fn from_units(units: Vec<Unit>) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        roster.replace(units)?;
        Ok(roster)
    }

    /// Append `unit` if it fits the budget given the current total. The same catalog
    /// unit may be added repeatedly; each add is validated on its own.
    pub fn add(&mut self, unit: Unit, budget: u32) -> Result<(), RosterError> {
        let would_be = u64::from(self.total) + u64::from(unit.points);
        if would_be > u64::from(budget) {
            return Err(RosterError::BudgetExceeded {
                name: unit.name,
                points: unit.points,
                would_be,
                budget,
            });
        }
        tracing::debug!(unit = %unit.id, points = unit.points, "roster add");
        // would_be <= budget, so the new total fits.
        self.total += unit.points;
        self.selected.push(unit);
        Ok(())
    }

    /// Remove the entry at `index`, preserving the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Result<Unit, RosterError> {
        if index >= self.selected.len() {
            return Err(RosterError::IndexOutOfRange {
                index,
                len: self.selected.len(),
            });
        }
        let removed = self.selected.remove(index);
        self.total -= removed.points;
        tracing::debug!(unit = %removed.id, index, "roster remove");
        Ok(removed)
    }

    /// Swap in a whole selection (used by load). Never trusts a persisted total.
    /// On overflow the current selection is left as it was.
    pub fn replace(&mut self, units: Vec<Unit>) -> Result<(), RosterError> {
        let total = sum_points(&units).map_err(|sum| RosterError::TotalOverflow { sum })?;
        self.total = total;
        self.selected = units;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.total = 0;
    }

    pub fn selected(&self) -> &[Unit] {
        &self.selected
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_over_budget(&self, budget: u32) -> bool {
        self.total > budget
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            units: self.selected.clone(),
            total_points: self.total,
        }
    }
}
