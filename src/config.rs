//! Runtime configuration: optional YAML file, then `MUSTER_*` environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::store::DEFAULT_ROSTER_PATH;
use crate::session::DEFAULT_BUDGET;

pub const DEFAULT_CONFIG_PATH: &str = "muster.yaml";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid {name} '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    /// Unit table loaded at startup by `serve`.
    pub catalog_path: Option<PathBuf>,
    pub roster_path: PathBuf,
    pub budget: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            catalog_path: None,
            roster_path: PathBuf::from(DEFAULT_ROSTER_PATH),
            budget: DEFAULT_BUDGET,
        }
    }
}

impl AppConfig {
    /// Parse a YAML config file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// File named by `MUSTER_CONFIG` (must exist), else `muster.yaml` when present,
    /// else defaults; then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var("MUSTER_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_yaml_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        base.with_overrides(|name| env::var(name).ok())
    }

    /// Apply `MUSTER_BIND`, `MUSTER_CATALOG`, `MUSTER_ROSTER_PATH`, `MUSTER_BUDGET`
    /// as read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = lookup("MUSTER_BIND") {
            self.bind = bind;
        }
        if let Some(catalog) = lookup("MUSTER_CATALOG") {
            self.catalog_path = Some(PathBuf::from(catalog));
        }
        if let Some(roster) = lookup("MUSTER_ROSTER_PATH") {
            self.roster_path = PathBuf::from(roster);
        }
        if let Some(budget) = lookup("MUSTER_BUDGET") {
            self.budget = budget
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "MUSTER_BUDGET",
                    value: budget.clone(),
                })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn yaml_keeps_defaults_for_missing_keys() {
        let config = AppConfig::from_yaml_str("budget: 750\ncatalog_path: data/units.csv\n").unwrap();
        assert_eq!(config.budget, 750);
        assert_eq!(config.catalog_path, Some(PathBuf::from("data/units.csv")));
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.roster_path, PathBuf::from(DEFAULT_ROSTER_PATH));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("MUSTER_BUDGET", "1500"), ("MUSTER_BIND", "0.0.0.0:8080")]);
        let config = AppConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.budget, 1500);
        assert_eq!(config.bind, "0.0.0.0:8080");
    }

    #[test]
    fn bad_budget_override_is_an_error() {
        let result = AppConfig::default().with_overrides(|name| {
            (name == "MUSTER_BUDGET").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnv { name: "MUSTER_BUDGET", .. })));
    }
}
