//! Event-driven session behaviour as seen by a render surface.

use muster::catalog::{Unit, UnitCatalog};
use muster::roster::MemoryStore;
use muster::session::{NoticeLevel, Session, UiEvent, NO_SAVED_ROSTER};
use muster::NationFilter;

fn scenario_session(budget: u32) -> Session {
    let mut session = Session::new(Box::new(MemoryStore::new()), budget);
    session.install_catalog(UnitCatalog::new(vec![
        Unit::new("A", "Tiger", 10).with_nation("Germany"),
        Unit::new("B", "Sherman", 8).with_nation("USA"),
    ]));
    session
}

fn add(id: &str) -> UiEvent {
    UiEvent::Add {
        unit_id: id.to_string(),
    }
}

fn visible_ids(session: &Session) -> Vec<String> {
    session.visible().into_iter().map(|u| u.id.clone()).collect()
}

#[test]
fn budget_scenario() {
    let mut session = scenario_session(15);

    assert!(session.handle(add("A")).accepted);
    assert_eq!(session.roster().total(), 10);

    let rejected = session.handle(add("B"));
    assert!(!rejected.accepted);
    assert_eq!(rejected.notice.map(|n| n.level), Some(NoticeLevel::Warning));
    assert_eq!(session.roster().total(), 10);

    assert!(session.handle(UiEvent::Remove { index: 0 }).accepted);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.total_points, 0);
    assert!(snapshot.selected.is_empty());
}

#[test]
fn visible_units_track_live_roster_total() {
    let mut session = scenario_session(18);
    assert_eq!(visible_ids(&session), vec!["A", "B"]);

    session.handle(add("B"));
    assert_eq!(visible_ids(&session), vec!["A", "B"]);

    session.handle(add("B"));
    assert!(visible_ids(&session).is_empty());

    session.handle(UiEvent::Remove { index: 1 });
    assert_eq!(visible_ids(&session), vec!["A", "B"]);
}

#[test]
fn search_and_nation_events_drive_filtering() {
    let mut session = scenario_session(100);
    session.handle(UiEvent::SetSearch {
        text: "SHER".to_string(),
    });
    assert_eq!(visible_ids(&session), vec!["B"]);

    session.handle(UiEvent::SetSearch { text: String::new() });
    session.handle(UiEvent::SetNation {
        nation: NationFilter::Only("Germany".to_string()),
    });
    assert_eq!(visible_ids(&session), vec!["A"]);
    assert_eq!(session.snapshot().nations, vec!["Germany", "USA"]);
}

#[test]
fn load_without_save_reports_no_saved_roster() {
    let mut session = scenario_session(15);
    let outcome = session.handle(UiEvent::LoadRequested);
    assert!(!outcome.accepted);
    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(notice.message, NO_SAVED_ROSTER);
}

#[test]
fn corrupt_saved_roster_is_reported_and_roster_kept() {
    let mut session = Session::new(Box::new(MemoryStore::with_raw("[{oops")), 50);
    session.install_catalog(UnitCatalog::new(vec![Unit::new("A", "Tiger", 10)]));
    session.handle(add("A"));

    let outcome = session.handle(UiEvent::LoadRequested);
    assert!(!outcome.accepted);
    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.starts_with(NO_SAVED_ROSTER));
    assert!(notice.message.contains("corrupt"));
    assert_eq!(session.roster().total(), 10);
}

#[test]
fn saved_roster_with_overflowing_total_is_treated_as_corrupt() {
    let raw = r#"[{"id":"X","name":"Colossus","points":4294967295},{"id":"Y","name":"Jeep","points":1}]"#;
    let mut session = Session::new(Box::new(MemoryStore::with_raw(raw)), 50);
    session.install_catalog(UnitCatalog::new(vec![Unit::new("A", "Tiger", 10)]));
    session.handle(add("A"));

    let outcome = session.handle(UiEvent::LoadRequested);
    assert!(!outcome.accepted);
    assert_eq!(outcome.notice.map(|n| n.level), Some(NoticeLevel::Warning));
    assert_eq!(session.roster().total(), 10);
    assert_eq!(session.roster().len(), 1);
}

#[test]
fn save_then_load_restores_same_roster() {
    let mut session = scenario_session(30);
    session.handle(add("A"));
    session.handle(add("B"));
    session.handle(add("A"));
    let saved = session.roster_snapshot();

    assert!(session.handle(UiEvent::SaveRequested).accepted);
    session.handle(UiEvent::Remove { index: 0 });
    session.handle(UiEvent::Remove { index: 0 });
    assert_eq!(session.roster().len(), 1);

    assert!(session.handle(UiEvent::LoadRequested).accepted);
    assert_eq!(session.roster_snapshot(), saved);
    assert_eq!(session.roster().total(), 28);
}

#[test]
fn failed_catalog_load_keeps_previous_catalog() {
    let mut session = scenario_session(30);
    assert!(session.load_catalog("   \n\n").is_err());
    assert_eq!(session.catalog().len(), 2);

    let count = session
        .load_catalog("Name,Nation,Points\nPuma,Germany,5\n")
        .expect("valid table");
    assert_eq!(count, 1);
    assert_eq!(session.catalog().units()[0].name, "Puma");
}

#[test]
fn replacing_catalog_resets_stale_nation_filter_and_keeps_roster() {
    let mut session = scenario_session(30);
    session.handle(add("B"));
    session.handle(UiEvent::SetNation {
        nation: NationFilter::Only("USA".to_string()),
    });

    session
        .load_catalog("Name,Nation,Points\nPuma,Germany,5\n")
        .expect("valid table");
    assert_eq!(session.snapshot().nation, NationFilter::All);
    assert_eq!(session.roster().total(), 8);
    assert_eq!(visible_ids(&session).len(), 1);
}
