mod common;

use common::FaultyStore;
use thoughtspace_core::{
    space_key, CanvasBounds, KeyValueStore, MemoryStore, SessionConfig, SessionError,
    SessionState, SpaceRepository, SpaceSession, SqliteKvStore, CURRENT_SPACE_KEY,
    DEFAULT_SPACE_NAME, THOUGHTS_KEY,
};

fn ready_session(store: &MemoryStore) -> SpaceSession<&MemoryStore> {
    let mut session = SpaceSession::new(store);
    session.initialize();
    session
}

#[test]
fn empty_store_initializes_fresh_space_and_pointer() {
    let store = MemoryStore::new();
    let mut session = SpaceSession::new(&store);
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(session.current_space().is_none());

    let space_id = session.initialize().id.clone();

    assert_eq!(session.state(), SessionState::Ready);
    assert!(!session.is_loading());
    let space = session.current_space().unwrap();
    assert!(space.thoughts.is_empty());
    assert!(!space.is_saved);
    assert_eq!(space.name, DEFAULT_SPACE_NAME);
    assert!(session.has_unsaved_changes());
    assert_eq!(
        store.get(CURRENT_SPACE_KEY).unwrap().as_deref(),
        Some(space_id.as_str())
    );
}

#[test]
fn initialize_restores_saved_space_from_pointer() {
    let document = r#"{"id":"space_1","name":"Groceries","thoughts":[{"id":0,"text":"milk","x":1,"y":2}],"createdAt":"2024-05-01T10:00:00.000Z","updatedAt":"2024-05-01T10:00:00.000Z","isSaved":true}"#;
    let store = MemoryStore::with_entries([
        (CURRENT_SPACE_KEY.to_string(), "space_1".to_string()),
        (space_key("space_1"), document.to_string()),
    ]);

    let session = ready_session(&store);

    let space = session.current_space().unwrap();
    assert_eq!(space.id, "space_1");
    assert_eq!(space.thoughts.len(), 1);
    assert!(!session.has_unsaved_changes());
}

#[test]
fn initialize_restores_unsaved_flag_from_document() {
    let store = MemoryStore::new();
    let mut draft = SpaceRepository::<MemoryStore>::create_new_space(Some("Draft"));
    draft.push_thought("x", 0.0, 0.0);
    SpaceRepository::new(&store).save_space(&draft).unwrap();
    store.set(CURRENT_SPACE_KEY, &draft.id).unwrap();

    let session = ready_session(&store);

    assert_eq!(session.current_space().unwrap().id, draft.id);
    assert!(session.has_unsaved_changes());
}

#[test]
fn dangling_pointer_falls_back_to_fresh_space() {
    let store = MemoryStore::with_entries([(CURRENT_SPACE_KEY, "space_gone")]);

    let session = ready_session(&store);

    let space = session.current_space().unwrap();
    assert_ne!(space.id, "space_gone");
    assert_eq!(
        store.get(CURRENT_SPACE_KEY).unwrap().as_deref(),
        Some(space.id.as_str())
    );
}

#[test]
fn initialize_reaches_ready_when_store_is_unreadable() {
    let store = FaultyStore::new();
    store.fail_reads(true);
    store.fail_writes_after(0);

    let mut session = SpaceSession::new(&store);
    session.initialize();

    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.current_space().is_some());
    assert!(session.has_unsaved_changes());
}

#[test]
fn fallback_space_uses_configured_name() {
    let store = FaultyStore::new();
    store.fail_reads(true);
    let config = SessionConfig {
        default_space_name: "Canvas".to_string(),
        ..SessionConfig::default()
    };

    let mut session = SpaceSession::with_config(&store, config);
    let returned = session.initialize().clone();

    assert_eq!(returned.name, "Canvas");
    assert_eq!(session.current_space(), Some(&returned));
}

#[test]
fn add_thought_assigns_sequential_ids_in_insertion_order() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);

    assert_eq!(session.add_thought("x"), Some(0));
    assert_eq!(session.add_thought("  y  "), Some(1));

    let thoughts = &session.current_space().unwrap().thoughts;
    let pairs: Vec<(i64, &str)> = thoughts.iter().map(|t| (t.id, t.text.as_str())).collect();
    assert_eq!(pairs, vec![(0, "x"), (1, "y")]);
}

#[test]
fn add_thought_places_bubble_inside_configured_canvas() {
    let store = MemoryStore::new();
    let config = SessionConfig {
        canvas: CanvasBounds::new(300.0, 500.0),
        ..SessionConfig::default()
    };
    let mut session = SpaceSession::with_config(&store, config);
    session.initialize();

    session.add_thought("placed").unwrap();

    let thought = &session.current_space().unwrap().thoughts[0];
    assert!((0.0..100.0).contains(&thought.x));
    assert!((0.0..300.0).contains(&thought.y));
}

#[test]
fn blank_text_is_ignored() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.save_current_space(None).unwrap();

    assert_eq!(session.add_thought("   "), None);

    assert!(session.current_space().unwrap().thoughts.is_empty());
    assert!(!session.has_unsaved_changes());
}

#[test]
fn mutations_before_initialize_are_noops() {
    let store = MemoryStore::new();
    let mut session = SpaceSession::new(&store);

    assert_eq!(session.add_thought("x"), None);
    assert!(!session.update_thought_position(0, 1.0, 1.0));
    session.clear_all_thoughts();
    assert!(matches!(
        session.save_current_space(None),
        Err(SessionError::NoCurrentSpace)
    ));
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn every_mutation_marks_space_unsaved() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    let id = session.add_thought_at("x", 1.0, 1.0).unwrap();

    session.save_current_space(None).unwrap();
    assert!(session.update_thought_position(id, 40.0, 50.0));
    assert!(!session.current_space().unwrap().is_saved);
    assert!(session.has_unsaved_changes());

    session.save_current_space(None).unwrap();
    session.clear_all_thoughts();
    assert!(!session.current_space().unwrap().is_saved);
    assert!(session.has_unsaved_changes());

    session.save_current_space(None).unwrap();
    session.add_thought("again");
    assert!(!session.current_space().unwrap().is_saved);
    assert!(session.has_unsaved_changes());
}

#[test]
fn update_position_touches_only_matching_thought() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    let first = session.add_thought_at("a", 1.0, 1.0).unwrap();
    let second = session.add_thought_at("b", 2.0, 2.0).unwrap();

    assert!(session.update_thought_position(second, 90.0, 80.0));
    assert!(!session.update_thought_position(77, 0.0, 0.0));

    let space = session.current_space().unwrap();
    let a = space.thought(first).unwrap();
    let b = space.thought(second).unwrap();
    assert_eq!((a.x, a.y), (1.0, 1.0));
    assert_eq!((b.x, b.y), (90.0, 80.0));
}

#[test]
fn non_finite_move_is_ignored_and_saved_space_reloads() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    let id = session.add_thought_at("keep", 1.0, 2.0).unwrap();
    session.save_current_space(None).unwrap();

    assert!(!session.update_thought_position(id, f64::NAN, 5.0));
    assert!(!session.update_thought_position(id, 5.0, f64::INFINITY));
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.add_thought_at("nan", f64::NAN, 0.0), None);

    session.save_current_space(Some("N")).unwrap();

    let space = session.current_space().unwrap().clone();
    let stored = session.repository().get_space(&space.id).unwrap();
    assert_eq!(stored, Some(space.clone()));
    let kept = space.thought(id).unwrap();
    assert_eq!((kept.x, kept.y), (1.0, 2.0));

    let restarted = ready_session(&store);
    assert_eq!(restarted.current_space().unwrap().id, space.id);
}

#[test]
fn add_thought_stops_when_ids_are_exhausted() {
    let document = r#"{"id":"space_1","name":"Full","thoughts":[{"id":9223372036854775807,"text":"last","x":0,"y":0}],"createdAt":"2024-05-01T10:00:00.000Z","updatedAt":"2024-05-01T10:00:00.000Z","isSaved":true}"#;
    let store = MemoryStore::with_entries([
        (CURRENT_SPACE_KEY.to_string(), "space_1".to_string()),
        (space_key("space_1"), document.to_string()),
    ]);
    let mut session = ready_session(&store);

    assert_eq!(session.add_thought("y"), None);

    let space = session.current_space().unwrap();
    assert_eq!(space.thoughts.len(), 1);
    assert!(space.is_saved);
    assert!(!session.has_unsaved_changes());
}

#[test]
fn next_id_follows_current_max_after_removal() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("a");
    let last = session.add_thought("b").unwrap();

    assert!(session.remove_thought(last));
    assert!(!session.remove_thought(last));
    assert_eq!(session.add_thought("c"), Some(1));

    session.remove_thought(0);
    assert_eq!(session.add_thought("d"), Some(2));
}

#[test]
fn save_persists_document_and_clears_unsaved_flag() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("x");

    session.save_current_space(Some("Plans")).unwrap();

    let space = session.current_space().unwrap().clone();
    assert!(space.is_saved);
    assert_eq!(space.name, "Plans");
    assert!(!session.has_unsaved_changes());

    let stored = session.repository().get_space(&space.id).unwrap().unwrap();
    assert!(stored.is_saved);
    assert_eq!(stored, space);
    let index = session.list_spaces().unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].thought_count, 1);
}

#[test]
fn save_without_name_keeps_existing_name() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.save_current_space(Some("Plans")).unwrap();
    session.save_current_space(None).unwrap();
    assert_eq!(session.current_space().unwrap().name, "Plans");
}

#[test]
fn failed_save_rolls_back_in_memory_state() {
    let store = FaultyStore::new();
    let mut session = SpaceSession::new(&store);
    session.initialize();
    session.add_thought("x");
    let before = session.current_space().unwrap().clone();

    store.fail_writes_after(0);
    let err = session.save_current_space(Some("Renamed")).unwrap_err();

    assert!(matches!(err, SessionError::Repo(_)));
    assert_eq!(session.current_space().unwrap(), &before);
    assert!(!session.current_space().unwrap().is_saved);
    assert!(session.has_unsaved_changes());
}

#[test]
fn create_new_space_switches_and_repoints() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("x");
    let old_id = session.current_space().unwrap().id.clone();

    session.create_new_space(false).unwrap();

    let space = session.current_space().unwrap();
    assert_ne!(space.id, old_id);
    assert!(space.thoughts.is_empty());
    assert!(session.has_unsaved_changes());
    assert_eq!(
        store.get(CURRENT_SPACE_KEY).unwrap().as_deref(),
        Some(space.id.as_str())
    );
    assert_eq!(session.repository().get_space(&old_id).unwrap(), None);
}

#[test]
fn create_new_space_can_save_current_first() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("keep me");
    let old_id = session.current_space().unwrap().id.clone();

    session.create_new_space(true).unwrap();

    let stored = session.repository().get_space(&old_id).unwrap().unwrap();
    assert!(stored.is_saved);
    assert_eq!(stored.thoughts[0].text, "keep me");
}

#[test]
fn failed_save_first_aborts_new_space() {
    let store = FaultyStore::new();
    let mut session = SpaceSession::new(&store);
    session.initialize();
    session.add_thought("x");
    let old_id = session.current_space().unwrap().id.clone();

    store.fail_writes_after(0);
    assert!(session.create_new_space(true).is_err());

    assert_eq!(session.current_space().unwrap().id, old_id);
    assert!(session.has_unsaved_changes());
}

#[test]
fn load_space_replaces_current_and_updates_pointer() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("first space");
    session.save_current_space(Some("First")).unwrap();
    let first_id = session.current_space().unwrap().id.clone();
    session.create_new_space(false).unwrap();

    assert!(session.load_space(&first_id).unwrap());

    let space = session.current_space().unwrap();
    assert_eq!(space.id, first_id);
    assert_eq!(space.name, "First");
    assert!(!session.has_unsaved_changes());
    assert_eq!(
        store.get(CURRENT_SPACE_KEY).unwrap().as_deref(),
        Some(first_id.as_str())
    );
}

#[test]
fn load_space_with_unknown_id_leaves_session_unchanged() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.add_thought("x");
    let before = session.current_space().unwrap().clone();
    let pointer = store.get(CURRENT_SPACE_KEY).unwrap();

    assert!(!session.load_space("space_missing").unwrap());

    assert_eq!(session.current_space().unwrap(), &before);
    assert!(session.has_unsaved_changes());
    assert_eq!(store.get(CURRENT_SPACE_KEY).unwrap(), pointer);
}

#[test]
fn delete_current_space_switches_to_fresh_space() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.save_current_space(Some("Doomed")).unwrap();
    let doomed = session.current_space().unwrap().id.clone();

    session.delete_space(&doomed).unwrap();

    let space = session.current_space().unwrap();
    assert_ne!(space.id, doomed);
    assert!(session.list_spaces().unwrap().is_empty());
    assert_eq!(session.repository().get_space(&doomed).unwrap(), None);
    assert_eq!(
        store.get(CURRENT_SPACE_KEY).unwrap().as_deref(),
        Some(space.id.as_str())
    );
}

#[test]
fn delete_other_space_keeps_current() {
    let store = MemoryStore::new();
    let mut session = ready_session(&store);
    session.save_current_space(Some("Other")).unwrap();
    let other = session.current_space().unwrap().id.clone();
    session.create_new_space(false).unwrap();
    let current = session.current_space().unwrap().id.clone();

    session.delete_space(&other).unwrap();

    assert_eq!(session.current_space().unwrap().id, current);
}

#[test]
fn import_legacy_thoughts_numbers_after_existing_ids() {
    let store = MemoryStore::with_entries([(
        THOUGHTS_KEY,
        r#"[{"id":5,"text":"old a","x":1,"y":1},{"id":9,"text":"old b","x":2,"y":2}]"#,
    )]);
    let mut session = ready_session(&store);
    session.add_thought("new");
    session.save_current_space(None).unwrap();

    assert_eq!(session.import_legacy_thoughts(), 2);

    let space = session.current_space().unwrap();
    let pairs: Vec<(i64, &str)> = space.thoughts.iter().map(|t| (t.id, t.text.as_str())).collect();
    assert_eq!(pairs, vec![(0, "new"), (1, "old a"), (2, "old b")]);
    assert!(session.has_unsaved_changes());
    assert!(store.get(THOUGHTS_KEY).unwrap().is_some());
}

#[test]
fn session_state_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thoughtspace.sqlite3");

    let saved_id = {
        let mut session = SpaceSession::new(SqliteKvStore::open(&path).unwrap());
        session.initialize();
        session.add_thought_at("persist me", 3.0, 4.0);
        session.save_current_space(Some("Disk")).unwrap();
        session.current_space().unwrap().id.clone()
    };

    let mut reopened = SpaceSession::new(SqliteKvStore::open(&path).unwrap());
    reopened.initialize();
    let space = reopened.current_space().unwrap();
    assert_eq!(space.id, saved_id);
    assert_eq!(space.name, "Disk");
    assert_eq!(space.thoughts[0].text, "persist me");
    assert!(!reopened.has_unsaved_changes());
}
