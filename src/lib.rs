//! Point-budgeted army roster builder: unit catalog ingestion, filtering, roster
//! management, persistence and export, plus a CLI and a local HTTP surface.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod roster;
pub mod server;
pub mod session;

pub use catalog::{FilterCriteria, NationFilter, Unit, UnitCatalog};
pub use roster::{RosterError, RosterManager, RosterSnapshot};
pub use session::{Session, UiEvent};
