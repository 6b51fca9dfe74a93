//! Tests for step resolution and convergence against the in-memory store.

use super::*;
use crate::store::{MemoryStore, StoreError};
use log::Level;
use std::cell::RefCell;
use std::rc::Rc;

// ── Helpers ────────────────────────────────────────────────────────────

/// Logging port that keeps every message for later assertions.
#[derive(Clone, Default)]
struct RecordingLog {
    entries: Rc<RefCell<Vec<(Level, String)>>>,
}

impl RecordingLog {
    fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl MigrationLog for RecordingLog {
    fn log(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

fn def(version: &str, direction: Direction, script: &str) -> MigrationDefinition {
    MigrationDefinition {
        version: Version::new(version),
        direction,
        script: script.to_string(),
    }
}

/// Register `versions` with `<v>up` / `<v>down` scripts.
fn register_symmetric(manager: &mut MigrationManager<'_, MemoryStore>, versions: &[&str]) {
    for v in versions {
        manager.register_definition(def(v, Direction::Up, &format!("{v}up"))).unwrap();
        manager.register_definition(def(v, Direction::Down, &format!("{v}down"))).unwrap();
    }
}

fn executed(store: &MemoryStore) -> Vec<(String, String)> {
    store
        .executed()
        .into_iter()
        .map(|(v, s)| (v.into_inner(), s))
        .collect()
}

fn pair(v: &str, s: &str) -> (String, String) {
    (v.to_string(), s.to_string())
}

// ── Registration ───────────────────────────────────────────────────────

#[test]
fn register_builds_ordered_registry() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    manager.register_all(vec![
        def("002", Direction::Up, "002up"),
        def("001", Direction::Down, "001down"),
        def("001", Direction::Up, "001up"),
    ])
    .unwrap();

    assert_eq!(manager.registry().versions(), &["001", "002"]);
    assert_eq!(manager.lowest_available().unwrap(), "001");
    assert_eq!(manager.highest_available().unwrap(), "002");
    let first = manager.registry().get("001").unwrap();
    assert_eq!(first.up_script.as_deref(), Some("001up"));
    assert_eq!(first.down_script.as_deref(), Some("001down"));
}

#[test]
fn empty_registry_has_no_bounds() {
    let store = MemoryStore::initialized();
    let manager = MigrationManager::new(&store);
    assert!(matches!(
        manager.highest_available(),
        Err(CoreError::EmptyRegistry)
    ));
    assert!(matches!(
        manager.lowest_available(),
        Err(CoreError::EmptyRegistry)
    ));
    assert!(matches!(
        manager.next_step_up(),
        Err(CoreError::EmptyRegistry)
    ));
}

#[test]
fn sentinel_version_cannot_be_registered() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);

    let err = manager
        .register_definition(def("000", Direction::Up, "000up"))
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidDefinitionFormat { .. }));
    assert!(manager.registered_versions().is_empty());

    let err = manager
        .register_all(vec![
            def("001", Direction::Up, "001up"),
            def("000", Direction::Down, "000down"),
        ])
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidDefinitionFormat { .. }));
    assert_eq!(manager.registered_versions(), &["001"]);

    // Nothing reserved slipped in, so the run reaches 001 in one step
    let report = manager.up(&Version::new("001")).unwrap();
    assert_eq!(report.steps, vec!["001"]);
    assert_eq!(executed(&store), vec![pair("001", "001up")]);
}

// ── Initialization ─────────────────────────────────────────────────────

#[test]
fn uninitialized_store_is_reported() {
    let store = MemoryStore::new();
    let manager = MigrationManager::new(&store);
    assert!(matches!(
        manager.current_version(),
        Err(CoreError::Store(StoreError::NotInitialized { .. }))
    ));
}

#[test]
fn initialize_twice_keeps_advanced_version() {
    let store = MemoryStore::new();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);

    manager.initialize_database().unwrap();
    assert_eq!(manager.current_version().unwrap(), "000");

    manager.up(&Version::new("002")).unwrap();
    manager.initialize_database().unwrap();
    assert_eq!(manager.current_version().unwrap(), "002");
}

// ── Step resolution ────────────────────────────────────────────────────

#[test]
fn next_step_up_from_sentinel_is_lowest() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["003", "001", "002"]);

    let step = manager.next_step_up().unwrap();
    assert_eq!(step.from, "000");
    assert_eq!(step.to, "001");
    assert_eq!(step.script, "001up");
    assert!(store.executed().is_empty());
}

#[test]
fn next_step_up_from_highest_fails() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);
    manager.up(&Version::new("002")).unwrap();

    assert!(matches!(
        manager.next_step_up(),
        Err(CoreError::NoNextStep { ref version, direction: Direction::Up }) if version == "002"
    ));
}

#[test]
fn next_step_down_from_lowest_fails() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);
    manager.up(&Version::new("001")).unwrap();

    assert!(matches!(
        manager.next_step_down(),
        Err(CoreError::NoNextStep {
            direction: Direction::Down,
            ..
        })
    ));
}

#[test]
fn next_step_down_from_sentinel_fails() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001"]);

    assert!(matches!(
        manager.next_step_down(),
        Err(CoreError::NoNextStep { ref version, .. }) if version == "000"
    ));
}

#[test]
fn next_step_down_runs_departing_down_script() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003"]);
    manager.up(&Version::new("003")).unwrap();

    let step = manager.next_step_down().unwrap();
    assert_eq!(step.from, "003");
    assert_eq!(step.to, "002");
    assert_eq!(step.script, "003down");
}

#[test]
fn unregistered_current_version_is_unknown() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);
    store.apply_step(&Version::new("005"), "external").unwrap();

    assert!(matches!(
        manager.next_step_up(),
        Err(CoreError::UnknownVersion { ref version }) if version == "005"
    ));
}

// ── up / down ──────────────────────────────────────────────────────────

#[test]
fn up_applies_each_step_in_order() {
    let store = MemoryStore::new();
    let mut manager = MigrationManager::new(&store);
    manager.register_definition(def("001", Direction::Up, "001up")).unwrap();
    manager.register_definition(def("002", Direction::Up, "002up")).unwrap();
    manager.register_definition(def("003", Direction::Up, "003up")).unwrap();

    manager.initialize_database().unwrap();
    assert_eq!(manager.current_version().unwrap(), "000");

    let report = manager.up(&Version::new("003")).unwrap();

    assert_eq!(
        executed(&store),
        vec![
            pair("001", "001up"),
            pair("002", "002up"),
            pair("003", "003up")
        ]
    );
    assert_eq!(manager.current_version().unwrap(), "003");
    assert_eq!(report.from, "000");
    assert_eq!(report.to, "003");
    assert_eq!(report.steps, vec!["001", "002", "003"]);
    assert!(!report.is_noop());
}

#[test]
fn up_to_current_version_is_noop() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);
    manager.up(&Version::new("002")).unwrap();
    let before = store.executed().len();

    let report = manager.up(&Version::new("002")).unwrap();
    assert!(report.is_noop());
    assert_eq!(store.executed().len(), before);

    // The sentinel is a valid target only while it is current
    let fresh = MemoryStore::initialized();
    let manager = MigrationManager::new(&fresh);
    assert!(manager.up(&Version::sentinel()).unwrap().is_noop());
    assert!(fresh.executed().is_empty());
}

#[test]
fn up_then_down_visits_versions_monotonically() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003", "004"]);

    let highest = manager.highest_available().unwrap();
    let lowest = manager.lowest_available().unwrap();
    manager.up(&highest).unwrap();
    let report = manager.down(&lowest).unwrap();

    assert_eq!(report.steps, vec!["003", "002", "001"]);
    assert_eq!(
        executed(&store),
        vec![
            pair("001", "001up"),
            pair("002", "002up"),
            pair("003", "003up"),
            pair("004", "004up"),
            pair("003", "004down"),
            pair("002", "003down"),
            pair("001", "002down"),
        ]
    );

    let recorded: Vec<String> = store
        .history()
        .unwrap()
        .into_iter()
        .map(|a| a.version.into_inner())
        .collect();
    assert_eq!(
        recorded,
        vec!["000", "001", "002", "003", "004", "003", "002", "001"]
    );
}

#[test]
fn up_to_intermediate_version_stops_there() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003"]);

    manager.up(&Version::new("002")).unwrap();
    assert_eq!(manager.current_version().unwrap(), "002");

    manager.up(&Version::new("003")).unwrap();
    assert_eq!(
        executed(&store).last(),
        Some(&pair("003", "003up"))
    );
}

#[test]
fn unregistered_target_fails_fast() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002"]);

    assert!(matches!(
        manager.up(&Version::new("009")),
        Err(CoreError::UnknownVersion { ref version }) if version == "009"
    ));
    assert!(matches!(
        manager.down(&Version::new("009")),
        Err(CoreError::UnknownVersion { .. })
    ));
    assert!(store.executed().is_empty());
}

#[test]
fn target_on_wrong_side_fails_before_any_step() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003"]);
    manager.up(&Version::new("002")).unwrap();
    let before = store.executed().len();

    assert!(matches!(
        manager.up(&Version::new("001")),
        Err(CoreError::NoNextStep {
            direction: Direction::Up,
            ..
        })
    ));
    assert!(matches!(
        manager.down(&Version::new("003")),
        Err(CoreError::NoNextStep {
            direction: Direction::Down,
            ..
        })
    ));
    assert_eq!(store.executed().len(), before);
}

#[test]
fn missing_script_fails_before_store_is_touched() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    manager.register_definition(def("001", Direction::Up, "001up")).unwrap();
    manager.register_definition(def("002", Direction::Up, "002up")).unwrap();
    manager.up(&Version::new("002")).unwrap();
    let before = store.history().unwrap().len();

    assert!(matches!(
        manager.down(&Version::new("001")),
        Err(CoreError::MissingScript { ref version, direction: Direction::Down }) if version == "002"
    ));
    assert_eq!(store.history().unwrap().len(), before);
    assert_eq!(manager.current_version().unwrap(), "002");
}

#[test]
fn failed_step_stops_run_and_becomes_baseline() {
    let store = MemoryStore::initialized().fail_on("002");
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003"]);

    let err = manager.up(&Version::new("003")).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Store(StoreError::ScriptFailed { ref version, .. }) if version == "002"
    ));
    assert_eq!(
        executed(&store),
        vec![pair("001", "001up"), pair("002", "002up")]
    );
    // The failed attempt is the newest record, so it is the current version
    assert_eq!(manager.current_version().unwrap(), "002");

    // The next run resolves its step from the failed version
    let report = manager.up(&Version::new("003")).unwrap();
    assert_eq!(report.from, "002");
    assert_eq!(report.steps, vec!["003"]);
}

// ── Planning ───────────────────────────────────────────────────────────

#[test]
fn plan_does_not_touch_store() {
    let store = MemoryStore::initialized();
    let mut manager = MigrationManager::new(&store);
    register_symmetric(&mut manager, &["001", "002", "003"]);

    let plan = manager.plan_up(&Version::new("003")).unwrap();
    let targets: Vec<&str> = plan.iter().map(|s| s.to.as_str()).collect();
    assert_eq!(targets, vec!["001", "002", "003"]);
    assert!(store.executed().is_empty());
    assert_eq!(manager.current_version().unwrap(), "000");

    manager.up(&Version::new("003")).unwrap();
    let plan = manager.plan_down(&Version::new("001")).unwrap();
    let scripts: Vec<&str> = plan.iter().map(|s| s.script.as_str()).collect();
    assert_eq!(scripts, vec!["003down", "002down"]);
    assert!(manager.plan_up(&Version::new("003")).unwrap().is_empty());
}

// ── Logging port ───────────────────────────────────────────────────────

#[test]
fn progress_goes_through_injected_log() {
    let store = MemoryStore::initialized();
    let log = RecordingLog::default();
    let mut manager = MigrationManager::with_log(&store, log.clone());
    register_symmetric(&mut manager, &["001", "002"]);

    manager.up(&Version::new("002")).unwrap();

    let info = log.messages(Level::Info);
    assert!(info.iter().any(|m| m.contains("000 -> 001")), "{info:?}");
    assert!(info.iter().any(|m| m.contains("001 -> 002")), "{info:?}");
    assert!(!log.messages(Level::Debug).is_empty());
    assert!(log.messages(Level::Error).is_empty());
}

#[test]
fn failures_are_logged_as_errors() {
    let store = MemoryStore::initialized().fail_on("001");
    let log = RecordingLog::default();
    let mut manager = MigrationManager::with_log(&store, log.clone());
    register_symmetric(&mut manager, &["001"]);

    assert!(manager.up(&Version::new("001")).is_err());
    let errors = log.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("001"));
}
