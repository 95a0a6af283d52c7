use std::sync::Arc;
use stickynote_core::{
    Board, DragState, InMemoryNoteRepository, NoteRepository, NoteStore, Offset, PersistMode,
    Position,
};

fn board() -> (Board, Arc<InMemoryNoteRepository>) {
    let repo = Arc::new(InMemoryNoteRepository::new());
    let store = NoteStore::new(repo.clone(), PersistMode::Immediate);
    (Board::new(store), repo)
}

#[test]
fn add_edit_drag_delete_scenario() {
    let (mut board, repo) = board();
    assert!(board.notes().is_empty());

    let id = board.on_add_clicked();
    assert_eq!(board.notes().len(), 1);
    assert_eq!(board.notes()[0].content, "");
    assert_eq!(board.notes()[0].position, Position::new(50.0, 50.0));

    assert!(board.on_content_changed(id, "hello"));
    assert_eq!(board.notes()[0].content, "hello");
    assert_eq!(board.notes()[0].position, Position::new(50.0, 50.0));

    assert!(board.on_drag_start(id, Position::new(100.0, 100.0)));
    assert_eq!(board.on_drag_move(Position::new(130.0, 120.0)), 1);
    assert_eq!(board.notes()[0].position, Position::new(80.0, 70.0));
    assert_eq!(board.on_drag_end(), 1);

    assert!(board.on_delete_clicked(id));
    assert!(board.notes().is_empty());
    assert!(repo.load_notes().unwrap().is_empty());
}

#[test]
fn drag_follows_linear_offset_for_any_pointer_path() {
    let (mut board, _repo) = board();
    let id = board.on_add_clicked();
    board.on_drag_start(id, Position::new(50.0, 50.0));
    board.on_drag_move(Position::new(250.0, 150.0));
    board.on_drag_end();

    let pos0 = board.notes()[0].position;
    let p0 = Position::new(260.0, 171.0);
    board.on_drag_start(id, p0);

    for p1 in [
        Position::new(0.0, 0.0),
        Position::new(-512.0, 64.0),
        Position::new(1_920.0, 1_080.0),
        Position::new(261.5, 170.25),
    ] {
        board.on_drag_move(p1);
        assert_eq!(board.notes()[0].position, pos0 + (p1 - p0));
    }
}

#[test]
fn moves_without_an_active_drag_are_ignored() {
    let (mut board, repo) = board();
    board.on_add_clicked();
    let saves = repo.save_count();

    assert_eq!(board.on_drag_move(Position::new(400.0, 400.0)), 0);
    assert_eq!(board.on_drag_end(), 0);

    assert_eq!(board.notes()[0].position, Position::DEFAULT_NOTE);
    assert_eq!(repo.save_count(), saves);
}

#[test]
fn drag_overflowing_to_infinity_leaves_note_in_place() {
    let (mut board, repo) = board();
    let id = board.on_add_clicked();
    let saves = repo.save_count();

    // Offset is about -f64::MAX, so the next target overflows.
    assert!(board.on_drag_start(id, Position::new(-f64::MAX, 50.0)));
    assert_eq!(board.on_drag_move(Position::new(f64::MAX, 50.0)), 0);
    assert_eq!(board.on_drag_move(Position::new(f64::NAN, 50.0)), 0);
    assert_eq!(board.on_drag_end(), 1);

    assert_eq!(board.notes()[0].position, Position::DEFAULT_NOTE);
    assert_eq!(repo.save_count(), saves);
    assert_eq!(repo.load_notes().unwrap(), board.notes().to_vec());
}

#[test]
fn pointer_up_returns_to_idle_and_stops_tracking() {
    let (mut board, _repo) = board();
    let id = board.on_add_clicked();

    board.on_drag_start(id, Position::new(60.0, 55.0));
    assert_eq!(board.dragging(), vec![id]);
    board.on_drag_move(Position::new(70.0, 65.0));
    board.on_drag_end();
    assert!(board.dragging().is_empty());

    board.on_drag_move(Position::new(900.0, 900.0));
    assert_eq!(board.notes()[0].position, Position::new(60.0, 60.0));
}

#[test]
fn drag_start_on_missing_note_is_rejected() {
    let (mut board, _repo) = board();
    assert!(!board.on_drag_start(12345, Position::new(1.0, 1.0)));
    assert!(board.dragging().is_empty());
}

#[test]
fn deleting_a_dragged_note_ends_its_drag() {
    let (mut board, _repo) = board();
    let dragged = board.on_add_clicked();
    let other = board.on_add_clicked();

    board.on_drag_start(dragged, Position::new(55.0, 55.0));
    assert!(board.on_delete_clicked(dragged));

    assert!(board.dragging().is_empty());
    assert_eq!(board.on_drag_move(Position::new(10.0, 10.0)), 0);
    assert_eq!(board.store().get(other).unwrap().position, Position::DEFAULT_NOTE);
}

#[test]
fn only_the_dragged_note_moves() {
    let (mut board, _repo) = board();
    let first = board.on_add_clicked();
    let second = board.on_add_clicked();

    board.on_drag_start(second, Position::new(60.0, 60.0));
    board.on_drag_move(Position::new(160.0, 60.0));

    assert_eq!(board.store().get(first).unwrap().position, Position::DEFAULT_NOTE);
    assert_eq!(
        board.store().get(second).unwrap().position,
        Position::new(150.0, 50.0)
    );
}

#[test]
fn loaded_notes_are_draggable() {
    let repo = Arc::new(InMemoryNoteRepository::new());
    let id = {
        let mut board = Board::new(NoteStore::new(repo.clone(), PersistMode::Immediate));
        board.on_add_clicked()
    };

    let mut reopened = Board::new(NoteStore::new(repo.clone(), PersistMode::Immediate));
    assert_eq!(reopened.load().len(), 1);
    assert!(reopened.on_drag_start(id, Position::new(50.0, 50.0)));
    reopened.on_drag_move(Position::new(75.0, 25.0));

    assert_eq!(reopened.notes()[0].position, Position::new(75.0, 25.0));
}

#[test]
fn controller_state_reports_captured_offset() {
    let mut drag = stickynote_core::DragController::new(9);
    drag.begin(Position::new(120.0, 80.0), Position::new(100.0, 50.0));

    assert_eq!(
        drag.state(),
        DragState::Dragging {
            offset: Offset::new(20.0, 30.0)
        }
    );
}
