//! The core engine: store + gate + sync worker, free of I/O.
//!
//! The engine never touches the filesystem or the network. It returns
//! [`Effect`]s describing the I/O it wants performed, and consumes
//! [`Event`]s describing how that I/O went. The runtime (or a test) sits on
//! the other side of that protocol. This keeps every invariant — FIFO queue
//! order, at-most-one in flight, stale-completion discard — testable with
//! plain synchronous calls.
//!
//! All state transitions funnel through the owned [`Store`], one at a time:
//! events and user actions are handled to completion before the next is
//! considered, so mutations are serialized by construction.

use crate::gate::{Gate, GateStep};
use crate::model::{Loader, PendingCommand};
use crate::state::{Action, HydratePayload, Snapshot, Store};
use crate::sync::{SyncOutcome, SyncWorker};
use std::time::Instant;

/// I/O the engine wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run the named loader; the completion must echo the generation.
    Load { loader: Loader, generation: u64 },
    /// Issue the remote append for this queued command.
    Append { command: PendingCommand },
    /// Subscribe to the session signal (emitted once, after the handshake).
    WatchSession,
    /// Write the snapshot's cached fields to durable storage.
    Persist,
}

/// Completions fed back into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LoadFinished {
        loader: Loader,
        generation: u64,
        outcome: Result<HydratePayload, String>,
    },
    SessionChanged {
        signed_in: bool,
    },
    AppendFinished {
        seq: u64,
        outcome: Result<(), String>,
    },
}

#[derive(Debug, Default)]
pub struct Engine {
    store: Store,
    gate: Gate,
    sync: SyncWorker,
    session_watched: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn next_retry_at(&self) -> Option<Instant> {
        self.gate.next_retry_at()
    }

    /// Apply a user action, then let the gate and sync worker react to the
    /// new snapshot.
    pub fn dispatch(&mut self, action: Action, now: Instant) -> Vec<Effect> {
        self.store.dispatch(&action);
        let mut effects = vec![Effect::Persist];
        effects.extend(self.tick(now));
        effects
    }

    /// Advance the gate and the sync worker against the current snapshot.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        for step in self.gate.tick(self.store.snapshot(), now) {
            match step {
                GateStep::Start { loader, generation } => {
                    effects.push(Effect::Load { loader, generation });
                }
                GateStep::Reset { loader } => {
                    self.store.dispatch(&Action::RetryReset { loader });
                    effects.push(Effect::Persist);
                    // the reset loader starts on this same tick
                    for step in self.gate.tick(self.store.snapshot(), now) {
                        if let GateStep::Start { loader, generation } = step {
                            effects.push(Effect::Load { loader, generation });
                        }
                    }
                }
            }
        }

        let snapshot = self.store.snapshot();
        if let Some(command) = self.sync.tick(snapshot.sync_ready(), snapshot.head()) {
            effects.push(Effect::Append { command });
        }
        effects
    }

    /// Feed one I/O completion back in.
    pub fn handle(&mut self, event: Event, now: Instant) -> Vec<Effect> {
        match event {
            Event::LoadFinished {
                loader,
                generation,
                outcome,
            } => {
                if !self.gate.finish(loader, generation) {
                    return Vec::new();
                }
                let mut effects = Vec::new();
                match outcome {
                    Ok(payload) => {
                        self.store.dispatch(&Action::Hydrate { loader, payload });
                        if loader == Loader::Handshake && !self.session_watched {
                            self.session_watched = true;
                            effects.push(Effect::WatchSession);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%loader, %err, "loader failed");
                        self.store.dispatch(&Action::MarkFailed { loader });
                    }
                }
                effects.push(Effect::Persist);
                effects.extend(self.tick(now));
                effects
            }
            Event::SessionChanged { signed_in } => {
                self.store.dispatch(&Action::SetSession { signed_in });
                let mut effects = vec![Effect::Persist];
                effects.extend(self.tick(now));
                effects
            }
            Event::AppendFinished { seq, outcome } => match self.sync.finish(seq, outcome.is_ok())
            {
                SyncOutcome::Confirmed => {
                    self.store.dispatch(&Action::ConfirmDequeue { seq });
                    let mut effects = vec![Effect::Persist];
                    effects.extend(self.tick(now));
                    effects
                }
                SyncOutcome::Parked => self.tick(now),
                SyncOutcome::Stale => Vec::new(),
            },
        }
    }
}
