//! Connectivity/session gate.
//!
//! Each named loader runs through `NOT_ATTEMPTED -> IN_FLIGHT -> OK | FAILED`,
//! and a failure walks back to `NOT_ATTEMPTED` after a fixed delay so the
//! loader re-attempts — except the local cache read, which never retries
//! (a failed cache read just means "no cache"). A loader only starts once its
//! prerequisites have succeeded:
//!
//! ```text
//! local                      (independent, first, unconditional)
//! client -> auth -> handshake -> sheets
//!                               (sheets also needs a signed-in session
//!                                and an empty sync queue)
//! ```
//!
//! Every attempt carries a generation; a completion with a stale generation
//! is discarded instead of clobbering a newer attempt's status.

use crate::model::{LoadStatus, Loader, LOADERS};
use crate::state::Snapshot;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Fixed delay before a failed loader is reset for another attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct Attempt {
    generation: u64,
    in_flight: bool,
    retry_at: Option<Instant>,
}

/// What the gate wants done this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStep {
    /// Start the loader's I/O; the completion must echo the generation.
    Start { loader: Loader, generation: u64 },
    /// The retry delay has elapsed; reset the failed status.
    Reset { loader: Loader },
}

#[derive(Debug, Default)]
pub struct Gate {
    attempts: BTreeMap<Loader, Attempt>,
    next_generation: u64,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every loader once against the snapshot: start whatever has its
    /// prerequisites met, and arm/fire retry resets for failures.
    pub fn tick(&mut self, snapshot: &Snapshot, now: Instant) -> Vec<GateStep> {
        let mut steps = Vec::new();
        for loader in LOADERS {
            let status = snapshot.loader_status(loader);
            let ready = prerequisites_met(loader, snapshot);
            let attempt = self.attempts.entry(loader).or_default();
            match status {
                LoadStatus::NotAttempted if ready && !attempt.in_flight => {
                    self.next_generation += 1;
                    let attempt = self.attempts.entry(loader).or_default();
                    attempt.generation = self.next_generation;
                    attempt.in_flight = true;
                    attempt.retry_at = None;
                    steps.push(GateStep::Start {
                        loader,
                        generation: self.next_generation,
                    });
                }
                LoadStatus::Failed if retries(loader) => match attempt.retry_at {
                    None => attempt.retry_at = Some(now + RETRY_DELAY),
                    Some(at) if now >= at => {
                        attempt.retry_at = None;
                        steps.push(GateStep::Reset { loader });
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }
        steps
    }

    /// Record a completion. Returns false when it is stale — superseded by a
    /// newer attempt — and must be ignored.
    pub fn finish(&mut self, loader: Loader, generation: u64) -> bool {
        let attempt = self.attempts.entry(loader).or_default();
        if !attempt.in_flight || attempt.generation != generation {
            tracing::debug!(%loader, generation, "discarding stale loader completion");
            return false;
        }
        attempt.in_flight = false;
        true
    }

    /// Earliest armed retry deadline, for drivers that want to wait it out.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.attempts.values().filter_map(|a| a.retry_at).min()
    }
}

/// The local cache read never retries; everything remote does.
pub fn retries(loader: Loader) -> bool {
    loader != Loader::Local
}

pub fn prerequisites_met(loader: Loader, snapshot: &Snapshot) -> bool {
    let ok = |l: Loader| snapshot.loader_status(l) == LoadStatus::Ok;
    match loader {
        Loader::Local | Loader::Client => true,
        Loader::Auth => ok(Loader::Client),
        Loader::Handshake => ok(Loader::Auth),
        // Never fetch over unconfirmed optimistic writes: a stale remote
        // snapshot would clobber them.
        Loader::Sheets => {
            ok(Loader::Handshake)
                && snapshot.session.is_signed_in()
                && snapshot.sync_queue.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fields, SheetKey};
    use crate::state::{Action, HydratePayload};

    fn started(steps: &[GateStep]) -> Vec<Loader> {
        steps
            .iter()
            .filter_map(|s| match s {
                GateStep::Start { loader, .. } => Some(*loader),
                GateStep::Reset { .. } => None,
            })
            .collect()
    }

    fn hydrated(snapshot: Snapshot, loader: Loader) -> Snapshot {
        snapshot.apply(&Action::Hydrate {
            loader,
            payload: HydratePayload::None,
        })
    }

    #[test]
    fn only_unblocked_loaders_start() {
        let mut gate = Gate::new();
        let now = Instant::now();
        let snapshot = Snapshot::default();

        let steps = gate.tick(&snapshot, now);
        assert_eq!(started(&steps), vec![Loader::Local, Loader::Client]);

        // Still in flight: a second tick starts nothing new.
        assert!(gate.tick(&snapshot, now).is_empty());
    }

    #[test]
    fn chain_advances_as_prerequisites_succeed() {
        let mut gate = Gate::new();
        let now = Instant::now();
        let mut snapshot = Snapshot::default();
        for step in gate.tick(&snapshot, now) {
            if let GateStep::Start { loader, generation } = step {
                assert!(gate.finish(loader, generation));
                snapshot = hydrated(snapshot, loader);
            }
        }

        let steps = gate.tick(&snapshot, now);
        assert_eq!(started(&steps), vec![Loader::Auth]);

        snapshot = hydrated(snapshot, Loader::Auth);
        let GateStep::Start { loader, generation } = steps[0].clone() else {
            panic!("expected a start");
        };
        assert!(gate.finish(loader, generation));

        let steps = gate.tick(&snapshot, now);
        assert_eq!(started(&steps), vec![Loader::Handshake]);
    }

    #[test]
    fn sheets_waits_for_session_and_empty_queue() {
        let mut snapshot = Snapshot::default();
        for loader in [Loader::Client, Loader::Auth, Loader::Handshake] {
            snapshot = hydrated(snapshot, loader);
        }
        assert!(!prerequisites_met(Loader::Sheets, &snapshot));

        let signed_in = snapshot.apply(&Action::SetSession { signed_in: true });
        assert!(prerequisites_met(Loader::Sheets, &signed_in));

        let queued = signed_in.apply(&Action::EnqueueAppend {
            sheet: SheetKey::Checkins,
            fields: Fields::new(),
        });
        assert!(
            !prerequisites_met(Loader::Sheets, &queued),
            "a pending optimistic write blocks the bulk fetch"
        );
    }

    #[test]
    fn failure_retries_after_the_fixed_delay() {
        let mut gate = Gate::new();
        let now = Instant::now();
        let mut snapshot = Snapshot::default();
        for step in gate.tick(&snapshot, now) {
            if let GateStep::Start { loader, generation } = step {
                gate.finish(loader, generation);
            }
        }
        snapshot = snapshot.apply(&Action::MarkFailed {
            loader: Loader::Client,
        });
        snapshot = hydrated(snapshot, Loader::Local);

        // First tick arms the deadline, nothing fires yet.
        assert!(gate.tick(&snapshot, now).is_empty());
        assert!(gate.next_retry_at().is_some());

        // Before the delay: still nothing.
        assert!(gate.tick(&snapshot, now + Duration::from_millis(500)).is_empty());

        // After the delay: a reset fires, and once the status resets the
        // loader starts again.
        let steps = gate.tick(&snapshot, now + RETRY_DELAY);
        assert_eq!(steps, vec![GateStep::Reset { loader: Loader::Client }]);

        snapshot = snapshot.apply(&Action::RetryReset {
            loader: Loader::Client,
        });
        let steps = gate.tick(&snapshot, now + RETRY_DELAY);
        assert_eq!(started(&steps), vec![Loader::Client]);
    }

    #[test]
    fn the_local_cache_read_never_retries() {
        let mut gate = Gate::new();
        let now = Instant::now();
        let mut snapshot = Snapshot::default();
        for step in gate.tick(&snapshot, now) {
            if let GateStep::Start { loader, generation } = step {
                gate.finish(loader, generation);
            }
        }
        snapshot = snapshot.apply(&Action::MarkFailed {
            loader: Loader::Local,
        });
        snapshot = hydrated(snapshot, Loader::Client);

        for offset in [Duration::ZERO, RETRY_DELAY, RETRY_DELAY * 10] {
            let steps = gate.tick(&snapshot, now + offset);
            assert!(!steps.contains(&GateStep::Reset { loader: Loader::Local }));
        }
    }

    #[test]
    fn stale_completions_are_discarded() {
        let mut gate = Gate::new();
        let now = Instant::now();
        let snapshot = Snapshot::default();
        let steps = gate.tick(&snapshot, now);
        let GateStep::Start { loader, generation } = steps[0].clone() else {
            panic!("expected a start");
        };

        // A completion for a generation that was never issued is stale.
        assert!(!gate.finish(loader, generation + 100));
        // The genuine completion still lands.
        assert!(gate.finish(loader, generation));
        // Delivering it twice is stale the second time.
        assert!(!gate.finish(loader, generation));
    }
}
