//! Unit catalog: typed unit records loaded from tabular text, indexed by id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

pub mod filter;
pub mod ingest;
pub mod rng;

pub use filter::{visible, FilterCriteria, NationFilter};
pub use ingest::{ingest, ingest_with, IngestError};
pub use rng::{IdSource, NonceIds};

/// Single catalog entry. Also the shape persisted for each roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nation: String,
    pub points: u32,
    /// Move, Aim, Shoot, Speed.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    /// Front, Side, Rear.
    #[serde(default)]
    pub armor: BTreeMap<String, f64>,
    #[serde(default)]
    pub special: String,
    /// Free-text columns outside the core schema (Weapons, Armor, ...).
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Unit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: u32) -> Self {
        Unit {
            id: id.into(),
            name: name.into(),
            nation: String::new(),
            points,
            stats: BTreeMap::new(),
            armor: BTreeMap::new(),
            special: String::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_nation(mut self, nation: impl Into<String>) -> Self {
        self.nation = nation.into();
        self
    }

    pub fn with_special(mut self, special: impl Into<String>) -> Self {
        self.special = special.into();
        self
    }

    /// Stat by column name; absent stats read as 0.
    pub fn stat(&self, name: &str) -> f64 {
        self.stats.get(name).copied().unwrap_or(0.0)
    }

    pub fn armor_value(&self, facing: &str) -> f64 {
        self.armor.get(facing).copied().unwrap_or(0.0)
    }
}

/// Read-only collection of units produced by one ingestion. Replaced wholesale, never edited.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: Vec<Unit>,
    by_id: HashMap<String, usize>,
}

impl UnitCatalog {
    pub fn new(units: Vec<Unit>) -> Self {
        let by_id = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (unit.id.clone(), idx))
            .collect();
        UnitCatalog { units, by_id }
    }

    /// All units in ingestion order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.by_id.get(id).map(|&idx| &self.units[idx])
    }

    /// First unit whose name matches case-insensitively. Used by the CLI, where ids are not known up front.
    pub fn find_by_name(&self, name: &str) -> Option<&Unit> {
        let wanted = name.trim().to_lowercase();
        self.units.iter().find(|u| u.name.to_lowercase() == wanted)
    }

    /// Distinct non-blank nations, sorted, for populating nation filter options.
    pub fn nations(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|u| u.nation.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
