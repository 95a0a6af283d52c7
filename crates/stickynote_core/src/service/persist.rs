//! Fire-and-forget persistence of collection snapshots.
//!
//! # Responsibility
//! - Hand every post-mutation snapshot to the repository without ever
//!   surfacing a failure to the mutating caller.
//! - Optionally move writes off the caller's thread and coalesce bursts.
//!
//! # Invariants
//! - Snapshots are issued in mutation order.
//! - Queued snapshots collapse to the newest one; the stored state always
//!   converges to the latest snapshot handed in.
//! - A debounced snapshot is written within `MAX_HOLD_DEBOUNCES * debounce`
//!   of the first unwritten change.
//! - `flush` returns only after every earlier snapshot has been written
//!   (or its write has failed and been logged).

use crate::model::note::Note;
use crate::repo::note_repo::NoteRepository;
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How snapshots reach the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// Write inline on the mutating thread.
    Immediate,
    /// Write on a worker thread. With a non-zero `debounce`, a snapshot is
    /// held until no newer one arrives for that long, but never longer than
    /// [`MAX_HOLD_DEBOUNCES`] debounce periods.
    Background { debounce: Duration },
}

/// Upper bound on how long a held snapshot may wait under a steady stream of
/// newer ones, in debounce periods.
pub const MAX_HOLD_DEBOUNCES: u32 = 4;

enum Command {
    Save(Vec<Note>),
    Flush(Sender<()>),
}

enum Delivery {
    Immediate,
    Background {
        tx: Option<Sender<Command>>,
        worker: Option<JoinHandle<()>>,
    },
}

/// Snapshot writer in front of a [`NoteRepository`].
pub struct Persister {
    repo: Arc<dyn NoteRepository>,
    delivery: Delivery,
}

impl Persister {
    pub fn new(repo: Arc<dyn NoteRepository>, mode: PersistMode) -> Self {
        let delivery = match mode {
            PersistMode::Immediate => Delivery::Immediate,
            PersistMode::Background { debounce } => spawn_worker(Arc::clone(&repo), debounce),
        };
        Self { repo, delivery }
    }

    pub fn repository(&self) -> &Arc<dyn NoteRepository> {
        &self.repo
    }

    /// Queues (or writes) a full snapshot. Never fails.
    pub fn persist(&self, snapshot: Vec<Note>) {
        match &self.delivery {
            Delivery::Immediate => write_snapshot(self.repo.as_ref(), &snapshot),
            Delivery::Background { tx, .. } => {
                let Some(tx) = tx else {
                    write_snapshot(self.repo.as_ref(), &snapshot);
                    return;
                };
                if let Err(mpsc::SendError(Command::Save(snapshot))) =
                    tx.send(Command::Save(snapshot))
                {
                    warn!(
                        "event=notes_persist module=store status=degraded reason=worker_gone fallback=inline"
                    );
                    write_snapshot(self.repo.as_ref(), &snapshot);
                }
            }
        }
    }

    /// Blocks until every snapshot issued so far has been handled.
    pub fn flush(&self) {
        if let Delivery::Background { tx: Some(tx), .. } = &self.delivery {
            let (ack_tx, ack_rx) = mpsc::channel();
            if tx.send(Command::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Delivery::Background { tx, worker } = &mut self.delivery {
            // Closing the channel lets the worker drain and exit.
            drop(tx.take());
            if let Some(worker) = worker.take() {
                if worker.join().is_err() {
                    error!("event=notes_persist module=store status=error reason=worker_panicked");
                }
            }
        }
    }
}

fn spawn_worker(repo: Arc<dyn NoteRepository>, debounce: Duration) -> Delivery {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("stickynote-persist".to_string())
        .spawn(move || run_worker(repo.as_ref(), &rx, debounce));

    match spawned {
        Ok(worker) => Delivery::Background {
            tx: Some(tx),
            worker: Some(worker),
        },
        Err(err) => {
            warn!(
                "event=notes_persist module=store status=degraded reason=spawn_failed fallback=inline error={err}"
            );
            Delivery::Immediate
        }
    }
}

fn run_worker(repo: &dyn NoteRepository, rx: &Receiver<Command>, debounce: Duration) {
    let max_hold = debounce.saturating_mul(MAX_HOLD_DEBOUNCES);
    let mut pending: Option<Vec<Note>> = None;
    // When the oldest unwritten change arrived.
    let mut held_since: Option<Instant> = None;

    loop {
        let next = if pending.is_none() {
            match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => return,
            }
        } else if debounce.is_zero() {
            match rx.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    flush_pending(repo, &mut pending);
                    return;
                }
            }
        } else {
            let held = held_since.map_or(Duration::ZERO, |since| since.elapsed());
            let remaining = max_hold.saturating_sub(held);
            if remaining.is_zero() {
                None
            } else {
                match rx.recv_timeout(debounce.min(remaining)) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        flush_pending(repo, &mut pending);
                        return;
                    }
                }
            }
        };

        match next {
            Some(Command::Save(snapshot)) => {
                held_since.get_or_insert_with(Instant::now);
                pending = Some(snapshot);
            }
            Some(Command::Flush(ack)) => {
                flush_pending(repo, &mut pending);
                held_since = None;
                let _ = ack.send(());
            }
            None => {
                flush_pending(repo, &mut pending);
                held_since = None;
            }
        }
    }
}

fn flush_pending(repo: &dyn NoteRepository, pending: &mut Option<Vec<Note>>) {
    if let Some(snapshot) = pending.take() {
        write_snapshot(repo, &snapshot);
    }
}

fn write_snapshot(repo: &dyn NoteRepository, snapshot: &[Note]) {
    let started_at = Instant::now();
    match repo.save_notes(snapshot) {
        Ok(()) => debug!(
            "event=notes_persist module=store status=ok backend={} notes={} duration_ms={}",
            repo.backend_name(),
            snapshot.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=notes_persist module=store status=error backend={} notes={} duration_ms={} error={}",
            repo.backend_name(),
            snapshot.len(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
