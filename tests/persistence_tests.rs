use chrono::NaiveDate;
use stair_rota::{
    JsonFileStore, MemoryStateStore, PersistenceError, Rota, ScheduleState, StateDefaults,
    StateStore, WeekKey, load_state_or_default, save_rota_to_csv,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn sample_state() -> ScheduleState {
    let mut state = ScheduleState::new(2024, vec!["A".into(), "B".into(), "C".into()]);
    state.address = "Dlouhá 5".into();
    state.set_override(WeekKey::new(2024, 10), "Z").unwrap();
    state
}

#[test]
fn json_file_round_trip() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("state.json"));

    store.save_state(&sample_state()).unwrap();
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded, sample_state());
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(store.load_state().unwrap().is_none());

    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2026);
    assert_eq!(loaded.neighbors.len(), 3);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "{ not json").unwrap();
    let store = JsonFileStore::new(file.path());

    assert!(matches!(
        store.load_state(),
        Err(PersistenceError::Serialization(_))
    ));
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(
        loaded,
        ScheduleState::from_defaults(&StateDefaults::default(), today())
    );
}

#[test]
fn partial_record_is_merged_with_defaults() {
    let store = MemoryStateStore::with_raw(r#"{"year": 2023, "customAssignments": {"2023-1": "X"}}"#);
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2023);
    assert_eq!(loaded.neighbors, vec!["Soused 1", "Soused 2", "Soused 3"]);
    assert_eq!(loaded.address, "Vaše adresa");
    assert_eq!(
        loaded.overrides.get(&WeekKey::new(2023, 1)).map(String::as_str),
        Some("X")
    );
}

#[test]
fn record_that_is_not_an_object_is_treated_as_absent() {
    for raw in ["[1, 2, 3]", "null", "\"2024\"", ""] {
        let store = MemoryStateStore::with_raw(raw);
        let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
        assert_eq!(loaded.year, 2026, "{raw}");
        assert_eq!(loaded.neighbors.len(), 3, "{raw}");
    }

    let store = MemoryStateStore::with_raw("[1, 2, 3]");
    assert!(matches!(
        store.load_state(),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn wrongly_typed_fields_are_dropped_one_by_one() {
    let store = MemoryStateStore::with_raw(
        r#"{"year":"2024","neighbors":["A","B"],"address":"Dlouha 5","customAssignments":{"2024-10":"Z"}}"#,
    );
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2026);
    assert_eq!(loaded.neighbors, vec!["A", "B"]);
    assert_eq!(loaded.address, "Dlouha 5");
    assert_eq!(loaded.overrides.get(&WeekKey::new(2024, 10)).unwrap(), "Z");

    let store = MemoryStateStore::with_raw(r#"{"year": 2024, "neighbors": "A, B", "address": 7}"#);
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2024);
    assert_eq!(loaded.neighbors.len(), 3);
    assert_eq!(loaded.address, "Vaše adresa");
}

#[test]
fn override_with_non_string_name_is_dropped_alone() {
    let store = MemoryStateStore::with_raw(
        r#"{"year": 2024, "customAssignments": {"2024-10": "Z", "2024-11": 5, "2024-12": null, "2024-013": "Q"}}"#,
    );
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2024);
    assert_eq!(loaded.overrides.len(), 1);
    assert_eq!(loaded.overrides.get(&WeekKey::new(2024, 10)).unwrap(), "Z");

    let store = MemoryStateStore::with_raw(r#"{"year": 2024, "customAssignments": ["Z"]}"#);
    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded.year, 2024);
    assert!(loaded.overrides.is_empty());
}

#[test]
fn memory_store_keeps_persisted_layout() {
    let store = MemoryStateStore::new();
    assert!(store.raw().is_none());
    store.save_state(&sample_state()).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&store.raw().unwrap()).unwrap();
    assert_eq!(raw["customAssignments"]["2024-10"], "Z");
    assert_eq!(raw["neighbors"][2], "C");

    let loaded = load_state_or_default(&store, &StateDefaults::default(), today());
    assert_eq!(loaded, sample_state());
}

#[test]
fn rota_csv_has_one_row_per_week() {
    let state = sample_state();
    let rota = Rota::build(&state, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    let file = NamedTempFile::new().unwrap();

    save_rota_to_csv(&rota, file.path()).unwrap();

    let mut reader = csv::Reader::from_path(file.path()).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "week",
            "month",
            "start",
            "end",
            "dates",
            "assignee",
            "is_override",
            "is_current"
        ]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 52);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "Leden");
    assert_eq!(&rows[0][2], "2024-01-01");
    assert_eq!(&rows[0][4], "1.1. - 7.1.");
    assert_eq!(&rows[0][5], "A");

    let week10 = &rows[9];
    assert_eq!(&week10[5], "Z");
    assert_eq!(&week10[6], "true");
    assert_eq!(&week10[7], "true");
}
