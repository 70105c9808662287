//! Parse comma-separated unit tables into a [UnitCatalog].
//!
//! Format: first non-blank line is the header, each later non-blank line is one unit.
//! No quoting: a value containing a comma cannot be represented. Numeric columns
//! (Points, Move, Aim, Shoot, Speed, Front, Side, Rear) coerce to 0 when missing or
//! unparsable; every other column is kept as trimmed text.

use std::collections::HashSet;

use thiserror::Error;

use super::rng::{IdSource, NonceIds};
use super::{Unit, UnitCatalog};

const STAT_COLUMNS: &[&str] = &["Move", "Aim", "Shoot", "Speed"];
const ARMOR_COLUMNS: &[&str] = &["Front", "Side", "Rear"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("malformed unit table: {0}")]
    MalformedInput(&'static str),
}

/// Where a header column lands in the [Unit].
#[derive(Debug, Clone, PartialEq)]
enum Column {
    Name,
    Nation,
    Points,
    Special,
    Stat(&'static str),
    Armor(&'static str),
    Extra(String),
}

fn classify_column(header: &str) -> Column {
    let matches = |name: &str| header.eq_ignore_ascii_case(name);
    if matches("Name") {
        return Column::Name;
    }
    if matches("Nation") {
        return Column::Nation;
    }
    if matches("Points") {
        return Column::Points;
    }
    if matches("Special") {
        return Column::Special;
    }
    if let Some(stat) = STAT_COLUMNS.iter().find(|s| matches(**s)) {
        return Column::Stat(*stat);
    }
    if let Some(facing) = ARMOR_COLUMNS.iter().find(|s| matches(**s)) {
        return Column::Armor(*facing);
    }
    Column::Extra(header.to_string())
}

fn parse_row(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Numeric coercion: missing or non-numeric values read as 0.
fn coerce_number(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Points are whole and non-negative: negatives clamp to 0, fractions round down.
fn coerce_points(raw: Option<&str>) -> u32 {
    let value = coerce_number(raw);
    if value <= 0.0 {
        0
    } else {
        value.floor().min(f64::from(u32::MAX)) as u32
    }
}

/// Collapse whitespace runs in a unit name to single hyphens.
pub fn slug(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Re-draws allowed before an id falls back to a row-numbered suffix.
const MAX_ID_ATTEMPTS: u32 = 16;

/// Unique id for `row`. After [MAX_ID_ATTEMPTS] colliding tokens the row index and,
/// if still taken, a counter are appended; each suffix is distinct, so this ends
/// within `issued.len() + 1` steps whatever the source returns.
fn assign_id(base: &str, row: usize, ids: &mut dyn IdSource, issued: &mut HashSet<String>) -> String {
    for attempt in 0..MAX_ID_ATTEMPTS {
        let candidate = format!("{base}-{}", ids.token(row, attempt));
        if issued.insert(candidate.clone()) {
            return candidate;
        }
    }
    tracing::warn!(row, "id source kept colliding; using row-numbered id");
    let fallback = format!("{base}-{}-r{row}", ids.token(row, MAX_ID_ATTEMPTS));
    let mut candidate = fallback.clone();
    let mut n = 1_usize;
    while !issued.insert(candidate.clone()) {
        candidate = format!("{fallback}-{n}");
        n += 1;
    }
    candidate
}

/// Ingest with a fresh OS-seeded nonce. Ids differ between calls on identical input.
pub fn ingest(raw: &str) -> Result<UnitCatalog, IngestError> {
    let mut ids = NonceIds::from_entropy();
    tracing::debug!(nonce = ids.nonce(), "ingesting unit table");
    ingest_with(raw, &mut ids)
}

/// Ingest using the supplied id source.
pub fn ingest_with(raw: &str, ids: &mut dyn IdSource) -> Result<UnitCatalog, IngestError> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or(IngestError::MalformedInput("no header line"))?;
    let columns: Vec<Column> = parse_row(header_line)
        .into_iter()
        .map(classify_column)
        .collect();
    if !columns.contains(&Column::Name) {
        if parse_row(header_line).iter().all(|h| h.is_empty()) {
            return Err(IngestError::MalformedInput("header has no column names"));
        }
        tracing::warn!("unit table header has no Name column; every row will be skipped");
    }

    let mut issued: HashSet<String> = HashSet::new();
    let mut units = Vec::new();

    for (row, line) in lines.enumerate() {
        let values = parse_row(line);
        let mut unit = Unit::new(String::new(), String::new(), 0);

        for (idx, column) in columns.iter().enumerate() {
            let value = values.get(idx).copied();
            match column {
                Column::Name => unit.name = value.unwrap_or_default().to_string(),
                Column::Nation => unit.nation = value.unwrap_or_default().to_string(),
                Column::Special => unit.special = value.unwrap_or_default().to_string(),
                Column::Points => unit.points = coerce_points(value),
                Column::Stat(name) => {
                    unit.stats.insert((*name).to_string(), coerce_number(value));
                }
                Column::Armor(facing) => {
                    unit.armor.insert((*facing).to_string(), coerce_number(value));
                }
                Column::Extra(name) => {
                    unit.extra
                        .insert(name.clone(), value.unwrap_or_default().to_string());
                }
            }
        }

        if unit.name.is_empty() {
            tracing::warn!(row, "skipping unit row with blank name");
            continue;
        }

        unit.id = assign_id(&slug(&unit.name), row, ids, &mut issued);
        units.push(unit);
    }

    tracing::info!(units = units.len(), "unit table ingested");
    Ok(UnitCatalog::new(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sequential;

    impl IdSource for Sequential {
        fn token(&mut self, row: usize, attempt: u32) -> String {
            format!("r{row}a{attempt}")
        }
    }

    /// Always returns the same token, forcing collisions between equal names.
    struct Stuck;

    impl IdSource for Stuck {
        fn token(&mut self, _row: usize, attempt: u32) -> String {
            if attempt == 0 {
                "same".to_string()
            } else {
                format!("same{attempt}")
            }
        }
    }

    /// Ignores `attempt` entirely.
    struct Constant;

    impl IdSource for Constant {
        fn token(&mut self, _row: usize, _attempt: u32) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn constant_id_source_still_terminates_with_unique_ids() {
        let catalog =
            ingest_with("Name,Points
Puma,5
Puma,5
Puma,5
", &mut Constant).unwrap();
        let ids: Vec<&str> = catalog.units().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["Puma-fixed", "Puma-fixed-r1", "Puma-fixed-r2"]);
    }

    #[test]
    fn slug_collapses_whitespace() {
        assert_eq!(slug("  King   Tiger II "), "King-Tiger-II");
    }

    #[test]
    fn coerce_points_clamps_and_floors() {
        assert_eq!(coerce_points(Some("12.9")), 12);
        assert_eq!(coerce_points(Some("-4")), 0);
        assert_eq!(coerce_points(Some("abc")), 0);
        assert_eq!(coerce_points(Some("NaN")), 0);
        assert_eq!(coerce_points(None), 0);
    }

    #[test]
    fn header_matching_ignores_case() {
        assert_eq!(classify_column("points"), Column::Points);
        assert_eq!(classify_column("FRONT"), Column::Armor("Front"));
        assert_eq!(classify_column("Weapons"), Column::Extra("Weapons".to_string()));
    }

    #[test]
    fn ids_use_injected_source() {
        let catalog = ingest_with("Name,Points\nKing Tiger,20\nPuma,5\n", &mut Sequential).unwrap();
        let ids: Vec<&str> = catalog.units().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["King-Tiger-r0a0", "Puma-r1a0"]);
    }

    #[test]
    fn colliding_ids_are_redrawn() {
        let catalog = ingest_with("Name,Points\nPuma,5\nPuma,5\n", &mut Stuck).unwrap();
        let ids: Vec<&str> = catalog.units().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["Puma-same", "Puma-same1"]);
    }

    #[test]
    fn blank_header_is_malformed() {
        assert_eq!(
            ingest_with(" , ,\nTiger,10", &mut Sequential).unwrap_err(),
            IngestError::MalformedInput("header has no column names")
        );
    }
}
