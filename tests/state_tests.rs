use chrono::NaiveDate;
use stair_rota::{ScheduleState, StateDefaults, StateError, StoredState, WeekKey};
use std::collections::BTreeMap;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn defaults_state() -> ScheduleState {
    ScheduleState::from_defaults(&StateDefaults::default(), today())
}

#[test]
fn defaults_use_current_year_and_three_neighbors() {
    let state = defaults_state();
    assert_eq!(state.year, 2026);
    assert_eq!(state.neighbors, vec!["Soused 1", "Soused 2", "Soused 3"]);
    assert_eq!(state.address, "Vaše adresa");
    assert!(state.overrides.is_empty());
}

#[test]
fn configured_year_beats_today() {
    let defaults = StateDefaults {
        year: Some(2030),
        ..StateDefaults::default()
    };
    assert_eq!(ScheduleState::from_defaults(&defaults, today()).year, 2030);
}

#[test]
fn add_and_rename_trim_names() {
    let mut state = defaults_state();
    let idx = state.add_neighbor("  Novákovi ").unwrap();
    assert_eq!(idx, 3);
    assert_eq!(state.neighbors[3], "Novákovi");

    state.rename_neighbor(0, " Dvořákovi").unwrap();
    assert_eq!(state.neighbors[0], "Dvořákovi");
}

#[test]
fn empty_names_are_rejected() {
    let mut state = defaults_state();
    assert_eq!(state.add_neighbor("   "), Err(StateError::EmptyName));
    assert_eq!(state.rename_neighbor(0, ""), Err(StateError::EmptyName));
    assert_eq!(
        state.set_override(WeekKey::new(2026, 1), " \t"),
        Err(StateError::EmptyName)
    );
    assert_eq!(state.neighbors[0], "Soused 1");
    assert!(state.overrides.is_empty());
}

#[test]
fn last_neighbor_cannot_be_removed() {
    let mut state = ScheduleState::new(2024, vec!["A".into(), "B".into()]);
    assert_eq!(state.remove_neighbor(0), Ok("A".to_string()));
    assert_eq!(state.remove_neighbor(0), Err(StateError::LastNeighbor));
    assert_eq!(state.neighbors, vec!["B"]);
}

#[test]
fn out_of_range_positions_are_rejected() {
    let mut state = ScheduleState::new(2024, vec!["A".into()]);
    assert_eq!(
        state.rename_neighbor(3, "X"),
        Err(StateError::NeighborOutOfRange { index: 3, len: 1 })
    );
    assert!(matches!(
        state.remove_neighbor(1),
        Err(StateError::NeighborOutOfRange { .. })
    ));
}

#[test]
fn overrides_set_and_clear() {
    let mut state = defaults_state();
    let key = WeekKey::new(2026, 10);
    state.set_override(key, "Z").unwrap();
    state.set_override(key, "Y").unwrap();
    assert_eq!(state.overrides.get(&key).map(String::as_str), Some("Y"));
    assert_eq!(state.clear_override(key), Some("Y".to_string()));
    assert_eq!(state.clear_override(key), None);
}

#[test]
fn blank_address_resets_to_placeholder() {
    let mut state = defaults_state();
    state.set_address("  Dlouhá 5, Praha ", "Vaše adresa");
    assert_eq!(state.address, "Dlouhá 5, Praha");
    state.set_address("   ", "Vaše adresa");
    assert_eq!(state.address, "Vaše adresa");
}

#[test]
fn stored_fields_override_defaults_one_by_one() {
    let stored = StoredState {
        year: Some(2024),
        neighbors: None,
        address: Some("Krátká 1".into()),
        custom_assignments: None,
    };
    let state = stored.merge_onto(defaults_state());
    assert_eq!(state.year, 2024);
    assert_eq!(state.neighbors, vec!["Soused 1", "Soused 2", "Soused 3"]);
    assert_eq!(state.address, "Krátká 1");
}

#[test]
fn malformed_override_keys_are_dropped() {
    let mut assignments = BTreeMap::new();
    assignments.insert("2024-10".to_string(), "Z".to_string());
    assignments.insert("week ten".to_string(), "Q".to_string());
    let stored = StoredState {
        custom_assignments: Some(assignments),
        ..StoredState::default()
    };
    let state = stored.merge_onto(defaults_state());
    assert_eq!(state.overrides.len(), 1);
    assert_eq!(
        state.overrides.get(&WeekKey::new(2024, 10)).map(String::as_str),
        Some("Z")
    );
}

#[test]
fn serialized_layout_uses_string_keys() {
    let mut state = ScheduleState::new(2024, vec!["A".into(), "B".into()]);
    state.address = "Dům".into();
    state.set_override(WeekKey::new(2024, 10), "Z").unwrap();
    state.set_override(WeekKey::new(2024, 2), "Y").unwrap();

    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "year": 2024,
            "neighbors": ["A", "B"],
            "address": "Dům",
            "customAssignments": { "2024-2": "Y", "2024-10": "Z" }
        })
    );

    let stored: StoredState = serde_json::from_value(value).unwrap();
    assert_eq!(stored, StoredState::from(&state));
    assert_eq!(stored.merge_onto(defaults_state()), state);
}
