use chrono::{Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use stickynote_core::{
    InMemoryNoteRepository, ManualClock, NoteRepository, NoteStore, PersistMode, Position,
    StoreEvent,
};

fn fixture() -> (NoteStore, Arc<InMemoryNoteRepository>, Arc<ManualClock>) {
    let repo = Arc::new(InMemoryNoteRepository::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
    ));
    let store = NoteStore::new(repo.clone(), PersistMode::Immediate).with_clock(clock.clone());
    (store, repo, clock)
}

#[test]
fn add_appends_empty_notes_with_distinct_ids() {
    let (mut store, _repo, _clock) = fixture();

    // Same clock tick for every add.
    let ids: Vec<_> = (0..25).map(|_| store.add()).collect();

    assert_eq!(store.len(), 25);
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    let stored: Vec<_> = store.notes().iter().map(|note| note.id).collect();
    assert_eq!(stored, ids);
    for note in store.notes() {
        assert_eq!(note.content, "");
        assert_eq!(note.position, Position::new(50.0, 50.0));
        assert_eq!(note.created_at, note.updated_at);
    }
}

#[test]
fn update_replaces_content_and_stamps_updated_at() {
    let (mut store, _repo, clock) = fixture();
    let id = store.add();
    let created_at = store.get(id).unwrap().created_at;

    clock.advance(Duration::seconds(1));
    assert!(store.update(id, "x"));
    let first_stamp = store.get(id).unwrap().updated_at;

    clock.advance(Duration::seconds(1));
    assert!(store.update(id, "y"));
    let note = store.get(id).unwrap();

    assert_eq!(note.content, "y");
    assert!(note.updated_at >= first_stamp);
    assert!(first_stamp > created_at);
    assert_eq!(note.created_at, created_at);
    assert_eq!(note.position, Position::DEFAULT_NOTE);
}

#[test]
fn move_changes_only_position_and_updated_at() {
    let (mut store, _repo, clock) = fixture();
    let id = store.add();
    store.update(id, "keep me");
    let before = store.get(id).unwrap().clone();

    clock.advance(Duration::milliseconds(16));
    assert!(store.move_note(id, Position::new(-40.0, 1_000.5)));
    let after = store.get(id).unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.content, before.content);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.position, Position::new(-40.0, 1_000.5));
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn delete_removes_only_the_match_and_keeps_order() {
    let (mut store, _repo, clock) = fixture();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            clock.advance(Duration::seconds(1));
            let id = store.add();
            store.update(id, format!("note {i}"));
            id
        })
        .collect();
    let survivors_before: Vec<_> = store
        .notes()
        .iter()
        .filter(|note| note.id != ids[1])
        .cloned()
        .collect();

    assert!(store.delete(ids[1]));

    assert_eq!(store.notes(), survivors_before.as_slice());
    assert!(store.get(ids[1]).is_none());
}

#[test]
fn lookup_misses_are_silent_no_ops() {
    let (mut store, repo, _clock) = fixture();
    let id = store.add();
    store.update(id, "stable");
    let snapshot = store.notes().to_vec();
    let saves = repo.save_count();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(*event));

    let missing = id + 1_000;
    assert!(!store.update(missing, "ghost"));
    assert!(!store.move_note(missing, Position::new(1.0, 1.0)));
    assert!(!store.delete(missing));

    assert_eq!(store.notes(), snapshot.as_slice());
    assert_eq!(repo.save_count(), saves);
    assert!(events.borrow().is_empty());
}

#[test]
fn non_finite_move_is_rejected_and_stored_document_stays_loadable() {
    let (mut store, repo, _clock) = fixture();
    let id = store.add();
    assert!(store.move_note(id, Position::new(80.0, 70.0)));
    let snapshot = store.notes().to_vec();
    let saves = repo.save_count();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(*event));

    assert!(!store.move_note(id, Position::new(f64::NAN, 0.0)));
    assert!(!store.move_note(id, Position::new(0.0, f64::INFINITY)));
    assert!(!store.move_note(id, Position::new(f64::NEG_INFINITY, f64::NAN)));

    assert_eq!(store.notes(), snapshot.as_slice());
    assert_eq!(repo.save_count(), saves);
    assert!(events.borrow().is_empty());

    assert_eq!(repo.load_notes().unwrap(), snapshot);
    assert_eq!(store.load(), snapshot.as_slice());
}

#[test]
fn every_mutation_persists_a_full_snapshot() {
    let (mut store, repo, _clock) = fixture();

    let first = store.add();
    let second = store.add();
    store.update(first, "hello");
    store.move_note(second, Position::new(300.0, 20.0));
    store.delete(first);

    assert_eq!(repo.save_count(), 5);
    assert_eq!(repo.load_notes().unwrap(), store.notes());
}

#[test]
fn observers_see_each_change_after_it_is_applied() {
    let (mut store, _repo, _clock) = fixture();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(*event));

    let id = store.add();
    store.update(id, "a");
    store.move_note(id, Position::new(1.0, 2.0));
    store.delete(id);
    store.load();

    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::Added(id),
            StoreEvent::ContentUpdated(id),
            StoreEvent::Moved(id),
            StoreEvent::Deleted(id),
            StoreEvent::Loaded { count: 0 },
        ]
    );
}

#[test]
fn load_restores_collection_and_never_reuses_ids() {
    let repo = Arc::new(InMemoryNoteRepository::new());
    let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(5_000).unwrap()));
    let stored_ids = {
        let mut store =
            NoteStore::new(repo.clone(), PersistMode::Immediate).with_clock(clock.clone());
        let a = store.add();
        let b = store.add();
        store.update(b, "second");
        vec![a, b]
    };
    let saves = repo.save_count();

    // Clock rewound: ids must still move past the loaded ones.
    clock.set(Utc.timestamp_millis_opt(1_000).unwrap());
    let mut reopened = NoteStore::new(repo.clone(), PersistMode::Immediate).with_clock(clock);
    let loaded: Vec<_> = reopened.load().iter().map(|note| note.id).collect();
    assert_eq!(loaded, stored_ids);
    assert_eq!(reopened.get(stored_ids[1]).unwrap().content, "second");
    assert_eq!(repo.save_count(), saves, "load must not write");

    let fresh = reopened.add();
    assert!(stored_ids.iter().all(|id| fresh > *id));
}

#[test]
fn load_failure_yields_empty_usable_store() {
    let repo = Arc::new(InMemoryNoteRepository::with_document("{ not json"));
    let mut store = NoteStore::new(repo, PersistMode::Immediate);

    assert!(store.load().is_empty());
    let id = store.add();
    assert!(store.update(id, "still works"));
    assert_eq!(store.len(), 1);
}

#[test]
fn custom_default_position_is_used_for_new_notes() {
    let (store, _repo, _clock) = fixture();
    let mut store = store.with_default_position(Position::new(0.0, 0.0));

    let id = store.add();
    assert_eq!(store.get(id).unwrap().position, Position::new(0.0, 0.0));
}
