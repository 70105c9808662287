//! Army-building session: owns the active catalog, the roster, and the current
//! search/nation/budget selections. Surfaces drive it with typed [UiEvent]s and
//! render from [SessionSnapshot]s; no surface mutates catalog or roster directly.

use serde::{Deserialize, Serialize};

use crate::catalog::{ingest, visible, FilterCriteria, IngestError, NationFilter, Unit, UnitCatalog};
use crate::roster::{RosterError, RosterManager, RosterSnapshot, RosterStore, StoreError};

pub const DEFAULT_BUDGET: u32 = 1000;

/// Events emitted by a render surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    Add { unit_id: String },
    Remove { index: usize },
    SetSearch { text: String },
    SetNation { nation: NationFilter },
    SetBudget { budget: u32 },
    SaveRequested,
    LoadRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-facing message produced while handling an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub const NO_SAVED_ROSTER: &str = "no saved roster found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl EventOutcome {
    fn accepted() -> Self {
        Self {
            accepted: true,
            notice: None,
        }
    }

    fn accepted_with(notice: Notice) -> Self {
        Self {
            accepted: true,
            notice: Some(notice),
        }
    }

    fn rejected(notice: Option<Notice>) -> Self {
        Self {
            accepted: false,
            notice,
        }
    }
}

/// Everything a surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub visible: Vec<Unit>,
    pub selected: Vec<Unit>,
    pub total_points: u32,
    pub budget: u32,
    pub remaining: u32,
    pub over_budget: bool,
    pub nations: Vec<String>,
    pub search: String,
    pub nation: NationFilter,
}

pub struct Session {
    catalog: UnitCatalog,
    roster: RosterManager,
    search: String,
    nation: NationFilter,
    budget: u32,
    store: Box<dyn RosterStore + Send>,
}

impl Session {
    pub fn new(store: Box<dyn RosterStore + Send>, budget: u32) -> Self {
        Self {
            catalog: UnitCatalog::default(),
            roster: RosterManager::new(),
            search: String::new(),
            nation: NationFilter::All,
            budget,
            store,
        }
    }

    /// Replace the catalog from raw tabular text. On failure the current catalog stays.
    /// A nation filter that no longer names a loaded nation resets to all.
    pub fn load_catalog(&mut self, raw: &str) -> Result<usize, IngestError> {
        let catalog = ingest(raw)?;
        self.install_catalog(catalog);
        Ok(self.catalog.len())
    }

    pub fn install_catalog(&mut self, catalog: UnitCatalog) {
        self.catalog = catalog;
        if let NationFilter::Only(nation) = &self.nation {
            if !self.catalog.nations().iter().any(|n| n == nation) {
                self.nation = NationFilter::All;
            }
        }
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn roster(&self) -> &RosterManager {
        &self.roster
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Criteria built from live state, so filtering never sees a stale roster total.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone(),
            nation: self.nation.clone(),
            budget: self.budget,
            roster_total: self.roster.total(),
        }
    }

    pub fn visible(&self) -> Vec<&Unit> {
        visible(&self.catalog, &self.criteria())
    }

    pub fn roster_snapshot(&self) -> RosterSnapshot {
        self.roster.snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            visible: self.visible().into_iter().cloned().collect(),
            selected: self.roster.selected().to_vec(),
            total_points: self.roster.total(),
            budget: self.budget,
            remaining: self.criteria().remaining(),
            over_budget: self.roster.is_over_budget(self.budget),
            nations: self.catalog.nations(),
            search: self.search.clone(),
            nation: self.nation.clone(),
        }
    }

    pub fn handle(&mut self, event: UiEvent) -> EventOutcome {
        match event {
            UiEvent::Add { unit_id } => self.add(&unit_id),
            UiEvent::Remove { index } => self.remove(index),
            UiEvent::SetSearch { text } => {
                self.search = text;
                EventOutcome::accepted()
            }
            UiEvent::SetNation { nation } => {
                self.nation = nation;
                EventOutcome::accepted()
            }
            UiEvent::SetBudget { budget } => self.set_budget(budget),
            UiEvent::SaveRequested => self.save(),
            UiEvent::LoadRequested => self.load(),
        }
    }

    fn add(&mut self, unit_id: &str) -> EventOutcome {
        let Some(unit) = self.catalog.get(unit_id).cloned() else {
            tracing::warn!(unit_id, "add requested for unknown unit");
            return EventOutcome::rejected(Some(Notice::warning(format!(
                "unit '{unit_id}' is not in the current catalog"
            ))));
        };
        match self.roster.add(unit, self.budget) {
            Ok(()) => EventOutcome::accepted(),
            Err(err) => {
                tracing::info!(unit_id, "add rejected: {err}");
                EventOutcome::rejected(Some(Notice::warning(err.to_string())))
            }
        }
    }

    fn remove(&mut self, index: usize) -> EventOutcome {
        match self.roster.remove_at(index) {
            Ok(_) => EventOutcome::accepted(),
            Err(err @ RosterError::IndexOutOfRange { .. }) => {
                tracing::error!("remove with invalid index: {err}");
                EventOutcome::rejected(None)
            }
            Err(err) => {
                tracing::error!("unexpected roster error on remove: {err}");
                EventOutcome::rejected(None)
            }
        }
    }

    fn set_budget(&mut self, budget: u32) -> EventOutcome {
        self.budget = budget;
        if self.roster.is_over_budget(budget) {
            return EventOutcome::accepted_with(Notice::warning(format!(
                "roster total {} pts is over the new {budget} pt budget",
                self.roster.total()
            )));
        }
        EventOutcome::accepted()
    }

    fn save(&mut self) -> EventOutcome {
        match self.store.save(self.roster.selected()) {
            Ok(()) => EventOutcome::accepted_with(Notice::info(format!(
                "roster saved ({} units, {} pts)",
                self.roster.len(),
                self.roster.total()
            ))),
            Err(err) => {
                tracing::error!("roster save failed: {err}");
                EventOutcome::rejected(Some(Notice::error(format!("could not save roster: {err}"))))
            }
        }
    }

    fn load(&mut self) -> EventOutcome {
        match self.store.load() {
            Ok(Some(units)) => {
                if let Err(err) = self.roster.replace(units) {
                    tracing::warn!("saved roster rejected: {err}");
                    return EventOutcome::rejected(Some(Notice::warning(format!(
                        "{NO_SAVED_ROSTER} (saved data is corrupt)"
                    ))));
                }
                let mut outcome = EventOutcome::accepted_with(Notice::info(format!(
                    "roster loaded ({} units, {} pts)",
                    self.roster.len(),
                    self.roster.total()
                )));
                if self.roster.is_over_budget(self.budget) {
                    outcome.notice = Some(Notice::warning(format!(
                        "loaded roster total {} pts is over the {} pt budget",
                        self.roster.total(),
                        self.budget
                    )));
                }
                outcome
            }
            Ok(None) => EventOutcome::rejected(Some(Notice::info(NO_SAVED_ROSTER))),
            Err(err @ StoreError::Corrupt(_)) => {
                tracing::warn!("saved roster unreadable: {err}");
                EventOutcome::rejected(Some(Notice::warning(format!(
                    "{NO_SAVED_ROSTER} (saved data is corrupt)"
                ))))
            }
            Err(err) => {
                tracing::error!("roster load failed: {err}");
                EventOutcome::rejected(Some(Notice::error(format!("could not load roster: {err}"))))
            }
        }
    }
}
