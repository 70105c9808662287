//! Visible-unit filtering: name search, nation, and affordability against the live roster total.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Unit, UnitCatalog};

const ALL_NATIONS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NationFilter {
    #[default]
    All,
    Only(String),
}

impl NationFilter {
    pub fn matches(&self, nation: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => nation == wanted,
        }
    }
}

impl FromStr for NationFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_NATIONS) {
            Ok(Self::All)
        } else {
            Ok(Self::Only(trimmed.to_string()))
        }
    }
}

impl fmt::Display for NationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_NATIONS}"),
            Self::Only(nation) => write!(f, "{nation}"),
        }
    }
}

impl Serialize for NationFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NationFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse::<NationFilter>().unwrap_or_default())
    }
}

/// Criteria for one filter evaluation. Rebuilt per interaction, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub nation: NationFilter,
    pub budget: u32,
    /// Roster total at evaluation time. Must be the live value, not a cached one.
    #[serde(default)]
    pub roster_total: u32,
}

impl FilterCriteria {
    /// Points left before the budget is hit; 0 when the roster is already at or over budget.
    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.roster_total)
    }

    pub fn is_affordable(&self, unit: &Unit) -> bool {
        u64::from(self.roster_total) + u64::from(unit.points) <= u64::from(self.budget)
    }
}

fn matches_search(unit: &Unit, needle: &str) -> bool {
    needle.is_empty() || unit.name.to_lowercase().contains(needle)
}

/// Units passing every predicate, in catalog order.
pub fn visible<'a>(catalog: &'a UnitCatalog, criteria: &FilterCriteria) -> Vec<&'a Unit> {
    let needle = criteria.search.trim().to_lowercase();
    catalog
        .units()
        .iter()
        .filter(|unit| {
            matches_search(unit, &needle)
                && criteria.nation.matches(&unit.nation)
                && criteria.is_affordable(unit)
        })
        .collect()
}
