//! Sync queue drain worker.
//!
//! Drains the snapshot's queue head-to-tail against the remote append API
//! with at most one write in flight at any time. Queue order is the only
//! order writes ever reach the remote store: a later command is never sent
//! before an earlier one completes.
//!
//! A failed head is *parked*, not retried with backoff: it stays at the head
//! and gets exactly one new attempt each time `ready` has a rising edge
//! (connectivity or session recovered) or the head itself changes. The
//! append primitive is not idempotent, so a confirmation lost mid-flight
//! means the replay will duplicate the remote row; that limitation is
//! documented rather than hidden.

use crate::model::PendingCommand;

/// What a completed append did to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The write landed; confirm and dequeue the command.
    Confirmed,
    /// The write failed; the command stays head-of-queue, parked.
    Parked,
    /// Completion for something no longer in flight; ignore it.
    Stale,
}

#[derive(Debug, Default)]
pub struct SyncWorker {
    in_flight: Option<u64>,
    parked: Option<u64>,
    was_ready: bool,
}

impl SyncWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Decide whether to issue the head command. Returns the command to send
    /// when a new attempt is due.
    pub fn tick(&mut self, ready: bool, head: Option<&PendingCommand>) -> Option<PendingCommand> {
        if ready && !self.was_ready {
            // rising edge: a parked head earns one more attempt
            self.parked = None;
        }
        self.was_ready = ready;

        if !ready {
            return None;
        }
        let head = head?;
        if self.in_flight.is_some() {
            return None;
        }
        if self.parked == Some(head.seq) {
            return None;
        }
        self.in_flight = Some(head.seq);
        tracing::debug!(seq = head.seq, sheet = %head.sheet, "sending queued append");
        Some(head.clone())
    }

    /// Record an append completion for `seq`.
    pub fn finish(&mut self, seq: u64, ok: bool) -> SyncOutcome {
        if self.in_flight != Some(seq) {
            return SyncOutcome::Stale;
        }
        self.in_flight = None;
        if ok {
            SyncOutcome::Confirmed
        } else {
            tracing::warn!(seq, "append failed; command stays queued");
            self.parked = Some(seq);
            SyncOutcome::Parked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fields, SheetKey};

    fn command(seq: u64) -> PendingCommand {
        PendingCommand {
            seq,
            sheet: SheetKey::Checkins,
            fields: Fields::new(),
        }
    }

    #[test]
    fn sends_nothing_until_ready() {
        let mut worker = SyncWorker::new();
        let head = command(1);
        assert_eq!(worker.tick(false, Some(&head)), None);
        assert_eq!(worker.tick(true, None), None);
        assert_eq!(worker.tick(true, Some(&head)).unwrap().seq, 1);
    }

    #[test]
    fn at_most_one_write_in_flight() {
        let mut worker = SyncWorker::new();
        let a = command(1);
        let b = command(2);

        assert!(worker.tick(true, Some(&a)).is_some());
        // A second drain tick before A resolves issues nothing, for A or B.
        assert_eq!(worker.tick(true, Some(&a)), None);
        assert_eq!(worker.tick(true, Some(&a)), None);

        assert_eq!(worker.finish(1, true), SyncOutcome::Confirmed);
        // Only now does B (the new head) go out.
        assert_eq!(worker.tick(true, Some(&b)).unwrap().seq, 2);
    }

    #[test]
    fn failed_head_waits_for_a_ready_rising_edge() {
        let mut worker = SyncWorker::new();
        let head = command(1);

        assert!(worker.tick(true, Some(&head)).is_some());
        assert_eq!(worker.finish(1, false), SyncOutcome::Parked);

        // Same head, ready still true: parked, no resend.
        assert_eq!(worker.tick(true, Some(&head)), None);

        // ready drops and recovers: exactly one more attempt.
        assert_eq!(worker.tick(false, Some(&head)), None);
        assert_eq!(worker.tick(true, Some(&head)).unwrap().seq, 1);
        assert_eq!(worker.tick(true, Some(&head)), None, "in flight again");

        assert_eq!(worker.finish(1, true), SyncOutcome::Confirmed);
    }

    #[test]
    fn a_new_head_clears_the_parked_state() {
        let mut worker = SyncWorker::new();
        let a = command(1);
        let b = command(2);

        assert!(worker.tick(true, Some(&a)).is_some());
        worker.finish(1, false);
        assert_eq!(worker.tick(true, Some(&a)), None);

        // Head changed (say, a reload rebuilt the queue): attempt it.
        assert_eq!(worker.tick(true, Some(&b)).unwrap().seq, 2);
    }

    #[test]
    fn stale_completions_are_ignored() {
        let mut worker = SyncWorker::new();
        let head = command(1);
        assert!(worker.tick(true, Some(&head)).is_some());

        assert_eq!(worker.finish(99, true), SyncOutcome::Stale);
        assert_eq!(worker.finish(1, true), SyncOutcome::Confirmed);
        assert_eq!(worker.finish(1, true), SyncOutcome::Stale);
    }
}
