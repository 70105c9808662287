//! Durable roster slot. The whole selection is written as one JSON array of unit
//! records (selection order) and read back wholesale; there are no partial updates.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::Unit;
use crate::roster::sum_points;

pub const DEFAULT_ROSTER_PATH: &str = "data/roster.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access roster slot: {0}")]
    Io(#[from] std::io::Error),
    #[error("saved roster is corrupt: {0}")]
    Corrupt(serde_json::Error),
    #[error("failed to encode roster: {0}")]
    Encode(serde_json::Error),
}

pub trait RosterStore {
    /// Overwrite the slot with `units`.
    fn save(&mut self, units: &[Unit]) -> Result<(), StoreError>;

    /// `None` when nothing was ever saved (or the slot is blank).
    fn load(&self) -> Result<Option<Vec<Unit>>, StoreError>;
}

fn encode(units: &[Unit]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(units).map_err(StoreError::Encode)
}

fn decode(raw: &str) -> Result<Option<Vec<Unit>>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let units: Vec<Unit> = serde_json::from_str(raw).map_err(StoreError::Corrupt)?;
    if let Err(sum) = sum_points(&units) {
        return Err(StoreError::Corrupt(serde::de::Error::custom(format!(
            "points add up to {sum}, beyond the largest representable total"
        ))));
    }
    Ok(Some(units))
}

/// JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROSTER_PATH)
    }
}

impl RosterStore for FileStore {
    fn save(&mut self, units: &[Unit]) -> Result<(), StoreError> {
        let payload = encode(units)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, payload)?;
        tracing::info!(path = %self.path.display(), units = units.len(), "roster saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Unit>>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        decode(&raw)
    }
}

/// In-process slot holding the serialized form, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-filled slot, e.g. to simulate hand-edited or corrupt saved state.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl RosterStore for MemoryStore {
    fn save(&mut self, units: &[Unit]) -> Result<(), StoreError> {
        self.slot = Some(encode(units)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Unit>>, StoreError> {
        match &self.slot {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> Vec<Unit> {
        let mut panzer = Unit::new("Panzer-IV-x1", "Panzer IV", 7).with_nation("Germany");
        panzer.stats.insert("Move".to_string(), 6.0);
        panzer.armor.insert("Front".to_string(), 4.5);
        panzer.extra.insert("Weapons".to_string(), "75mm".to_string());
        vec![panzer, Unit::new("Jeep-x2", "Jeep", 2)]
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&units()).unwrap();
        assert_eq!(store.load().unwrap(), Some(units()));
    }

    #[test]
    fn corrupt_slot_is_reported() {
        let store = MemoryStore::with_raw("{not json");
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn negative_points_are_corrupt() {
        let store = MemoryStore::with_raw(r#"[{"id":"x","name":"X","points":-3}]"#);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn points_overflowing_the_total_are_corrupt() {
        let store = MemoryStore::with_raw(
            r#"[{"id":"x","name":"X","points":4294967295},{"id":"y","name":"Y","points":1}]"#,
        );
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn stats_survive_save_and_load_bit_for_bit() {
        let mut unit = Unit::new("Recce-x3", "Recce", 3);
        unit.stats.insert("Move".to_string(), 24.199428066666666);
        unit.armor.insert("Front".to_string(), 0.1 + 0.2);
        let mut store = MemoryStore::new();
        store.save(&[unit.clone()]).unwrap();
        let loaded = store.load().unwrap().expect("saved");
        assert_eq!(loaded[0].stat("Move").to_bits(), 24.199428066666666_f64.to_bits());
        assert_eq!(loaded[0].armor_value("Front").to_bits(), (0.1_f64 + 0.2).to_bits());
        assert_eq!(loaded, vec![unit]);
    }

    #[test]
    fn blank_slot_reads_as_empty() {
        let store = MemoryStore::with_raw("  \n");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_missing_file_is_none_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join("roster.json"));
        assert!(store.load().unwrap().is_none());
        store.save(&units()).unwrap();
        assert_eq!(store.load().unwrap(), Some(units()));
    }
}
