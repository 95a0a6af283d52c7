//! Headless driver for the sticky notes core.
//!
//! Reads configuration from `STICKYNOTES_*` environment variables, applies
//! one command to the stored board and prints the resulting notes.

use clap::{Parser, Subcommand};
use log::info;
use std::process::ExitCode;
use stickynote_core::{init_logging, AppConfig, Board, Note, NoteId, Position};

#[derive(Parser)]
#[command(name = "stickynotes")]
#[command(version, about = "Inspect and edit the sticky notes board")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage
    Ping,
    /// Print every note in board order
    List,
    /// Add an empty note at the default position
    Add,
    /// Replace a note's text
    Edit { id: NoteId, text: String },
    /// Place a note at an absolute position
    #[command(allow_negative_numbers = true)]
    Move { id: NoteId, x: f64, y: f64 },
    /// Simulate a pointer drag from one point to another
    #[command(allow_negative_numbers = true)]
    Drag {
        id: NoteId,
        from_x: f64,
        from_y: f64,
        to_x: f64,
        to_y: f64,
    },
    /// Remove a note
    Delete { id: NoteId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Ping = cli.command {
        println!("stickynote_core ping={}", stickynote_core::ping());
        println!("stickynote_core version={}", stickynote_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    let log_dir = config
        .absolute_log_dir()
        .map_err(|err| format!("cannot resolve log directory: {err}"))?;
    init_logging(config.log_level, &log_dir)?;

    let mut board = config.open_board().map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start storage={:?} notes={}",
        config.storage,
        board.notes().len()
    );

    let applied = apply(&mut board, command);
    board.flush();
    print_notes(board.notes());

    if applied {
        Ok(())
    } else {
        Err("no note with that id".to_string())
    }
}

/// Returns `false` when the command targeted a missing note.
fn apply(board: &mut Board, command: Command) -> bool {
    match command {
        Command::Ping | Command::List => true,
        Command::Add => {
            let id = board.on_add_clicked();
            println!("added {id}");
            true
        }
        Command::Edit { id, text } => board.on_content_changed(id, text),
        Command::Move { id, x, y } => {
            let Some(current) = board.store().get(id).map(|note| note.position) else {
                return false;
            };
            // A drag whose pointer sits exactly on the note's origin.
            board.on_drag_start(id, current);
            board.on_drag_move(Position::new(x, y));
            board.on_drag_end();
            true
        }
        Command::Drag {
            id,
            from_x,
            from_y,
            to_x,
            to_y,
        } => {
            if !board.on_drag_start(id, Position::new(from_x, from_y)) {
                return false;
            }
            board.on_drag_move(Position::new(to_x, to_y));
            board.on_drag_end();
            true
        }
        Command::Delete { id } => board.on_delete_clicked(id),
    }
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in notes {
        println!(
            "{} @ ({}, {}) created={} updated={} content={:?}",
            note.id,
            note.position.x,
            note.position.y,
            note.created_at.to_rfc3339(),
            note.updated_at.to_rfc3339(),
            note.content
        );
    }
}
