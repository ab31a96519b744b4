//! The process-wide snapshot and its transitions.
//!
//! All mutation happens here, through pure functions of
//! `(snapshot, action) -> snapshot`: no transition performs I/O, and applying
//! the same action to the same snapshot twice yields the same result. That
//! determinism is what makes queue replay after a retry safe, and what keeps
//! the tests in this crate free of timing.
//!
//! [`Store`] is the single owner of the current snapshot. Everything else
//! reads it by reference; nothing holds a global.

use crate::model::{
    ColumnKey, Fields, LoadStatus, Loader, PendingCommand, Row, SearchState, Session,
    SheetKey, SHEETS,
};
use std::collections::BTreeMap;

pub type SheetRows = BTreeMap<SheetKey, Vec<Row>>;
pub type SheetKeys = BTreeMap<SheetKey, Vec<Option<ColumnKey>>>;

/// What a finished local-cache read carries into hydration. Each field is
/// independently optional: an absent cache key leaves the default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedState {
    pub keys: Option<SheetKeys>,
    pub rows: Option<SheetRows>,
    pub sync_queue: Option<Vec<PendingCommand>>,
    pub signed_in: Option<bool>,
    pub search: Option<SearchState>,
}

/// Payload delivered by a successful loader.
#[derive(Debug, Clone, PartialEq)]
pub enum HydratePayload {
    /// Setup-only loaders carry nothing.
    None,
    /// The local cache read.
    Cache(CachedState),
    /// The bulk dataset fetch; replaces rows and column order wholesale.
    Sheets { rows: SheetRows, keys: SheetKeys },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Hydrate {
        loader: Loader,
        payload: HydratePayload,
    },
    MarkFailed {
        loader: Loader,
    },
    RetryReset {
        loader: Loader,
    },
    SetSession {
        signed_in: bool,
    },
    EnqueueAppend {
        sheet: SheetKey,
        fields: Fields,
    },
    ConfirmDequeue {
        seq: u64,
    },
    SetSearch {
        query: String,
        count: usize,
    },
}

/// Full in-memory state of the application at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub load_status: BTreeMap<Loader, LoadStatus>,
    pub session: Session,
    pub sync_queue: Vec<PendingCommand>,
    pub rows: SheetRows,
    pub keys: SheetKeys,
    pub search: SearchState,
    /// Source of queue-command identities; rebuilt past any hydrated queue.
    pub next_seq: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        let mut rows = SheetRows::new();
        let mut keys = SheetKeys::new();
        for sheet in SHEETS {
            rows.insert(sheet.key, Vec::new());
            keys.insert(sheet.key, Vec::new());
        }
        Self {
            load_status: BTreeMap::new(),
            session: Session::Unknown,
            sync_queue: Vec::new(),
            rows,
            keys,
            search: SearchState::default(),
            next_seq: 1,
        }
    }
}

impl Snapshot {
    pub fn loader_status(&self, loader: Loader) -> LoadStatus {
        self.load_status
            .get(&loader)
            .copied()
            .unwrap_or(LoadStatus::NotAttempted)
    }

    /// Ready for sync: session authenticated and the remote handshake done.
    pub fn sync_ready(&self) -> bool {
        self.session.is_signed_in() && self.loader_status(Loader::Handshake) == LoadStatus::Ok
    }

    pub fn head(&self) -> Option<&PendingCommand> {
        self.sync_queue.first()
    }

    pub fn sheet_rows(&self, sheet: SheetKey) -> &[Row] {
        self.rows.get(&sheet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply one transition, producing the next snapshot. Pure: no I/O, no
    /// clocks, no randomness.
    #[must_use]
    pub fn apply(&self, action: &Action) -> Snapshot {
        let mut next = self.clone();
        match action {
            Action::Hydrate { loader, payload } => {
                next.load_status.insert(*loader, LoadStatus::Ok);
                match payload {
                    HydratePayload::None => {}
                    HydratePayload::Cache(cached) => {
                        if let Some(keys) = &cached.keys {
                            next.keys = keys.clone();
                        }
                        if let Some(rows) = &cached.rows {
                            next.rows = rows.clone();
                        }
                        if let Some(queue) = &cached.sync_queue {
                            next.sync_queue = queue.clone();
                        }
                        // Only a cached signed-in applies; a cached signed-out
                        // never downgrades what the session already knows.
                        if cached.signed_in == Some(true) {
                            next.session = Session::SignedIn;
                        }
                        if let Some(search) = &cached.search {
                            next.search = search.clone();
                        }
                        let past_queue = next
                            .sync_queue
                            .iter()
                            .map(|c| c.seq + 1)
                            .max()
                            .unwrap_or(1);
                        next.next_seq = next.next_seq.max(past_queue);
                    }
                    HydratePayload::Sheets { rows, keys } => {
                        next.rows = rows.clone();
                        next.keys = keys.clone();
                    }
                }
            }
            Action::MarkFailed { loader } => {
                next.load_status.insert(*loader, LoadStatus::Failed);
            }
            Action::RetryReset { loader } => {
                if next.loader_status(*loader) == LoadStatus::Failed {
                    next.load_status.insert(*loader, LoadStatus::NotAttempted);
                }
            }
            Action::SetSession { signed_in } => {
                next.session = if *signed_in {
                    Session::SignedIn
                } else {
                    Session::SignedOut
                };
            }
            Action::EnqueueAppend { sheet, fields } => {
                let rows = next.rows.entry(*sheet).or_default();
                let row = Row::new(rows.len(), fields.clone());
                rows.push(row);
                next.sync_queue.push(PendingCommand {
                    seq: next.next_seq,
                    sheet: *sheet,
                    fields: fields.clone(),
                });
                next.next_seq += 1;
            }
            Action::ConfirmDequeue { seq } => {
                if let Some(pos) = next.sync_queue.iter().position(|c| c.seq == *seq) {
                    next.sync_queue.remove(pos);
                }
            }
            Action::SetSearch { query, count } => {
                next.search = SearchState {
                    query: query.clone(),
                    count: *count,
                };
            }
        }
        next
    }
}

/// Owns the current snapshot and applies transitions one at a time,
/// logging every action the way the original's store middleware did.
#[derive(Debug, Default)]
pub struct Store {
    snapshot: Snapshot,
}

impl Store {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn dispatch(&mut self, action: &Action) {
        let next = self.snapshot.apply(action);
        tracing::debug!(
            action = action_name(action),
            queue = next.sync_queue.len(),
            session = ?next.session,
            "dispatch"
        );
        tracing::trace!(?action, "dispatch detail");
        self.snapshot = next;
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Hydrate { .. } => "hydrate",
        Action::MarkFailed { .. } => "mark_failed",
        Action::RetryReset { .. } => "retry_reset",
        Action::SetSession { .. } => "set_session",
        Action::EnqueueAppend { .. } => "enqueue_append",
        Action::ConfirmDequeue { .. } => "confirm_dequeue",
        Action::SetSearch { .. } => "set_search",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn fields(name: &str) -> Fields {
        Fields::from([(ColumnKey::Name, Value::Text(name.into()))])
    }

    #[test]
    fn enqueue_preserves_order_and_assigns_contiguous_indexes() {
        let mut snapshot = Snapshot::default();
        for name in ["a", "b", "c"] {
            snapshot = snapshot.apply(&Action::EnqueueAppend {
                sheet: SheetKey::Checkins,
                fields: fields(name),
            });
        }

        let rows = snapshot.sheet_rows(SheetKey::Checkins);
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.index, i);
        }

        let seqs: Vec<u64> = snapshot.sync_queue.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(
            snapshot.sync_queue[0].fields,
            fields("a"),
            "queue order equals enqueue order"
        );
    }

    #[test]
    fn enqueue_is_visible_in_rows_and_queue_together() {
        let snapshot = Snapshot::default().apply(&Action::EnqueueAppend {
            sheet: SheetKey::Todo,
            fields: fields("x"),
        });
        assert_eq!(snapshot.sheet_rows(SheetKey::Todo).len(), 1);
        assert_eq!(snapshot.sync_queue.len(), 1);
        assert_eq!(snapshot.sync_queue[0].sheet, SheetKey::Todo);
    }

    #[test]
    fn confirm_dequeue_removes_only_the_matching_command() {
        let mut snapshot = Snapshot::default();
        for name in ["a", "b"] {
            snapshot = snapshot.apply(&Action::EnqueueAppend {
                sheet: SheetKey::Checkins,
                fields: fields(name),
            });
        }
        let head_seq = snapshot.head().unwrap().seq;
        let snapshot = snapshot.apply(&Action::ConfirmDequeue { seq: head_seq });
        assert_eq!(snapshot.sync_queue.len(), 1);
        assert_eq!(snapshot.head().unwrap().fields, fields("b"));
        // rows are never removed
        assert_eq!(snapshot.sheet_rows(SheetKey::Checkins).len(), 2);
    }

    #[test]
    fn confirm_dequeue_of_absent_command_is_a_no_op() {
        let snapshot = Snapshot::default().apply(&Action::EnqueueAppend {
            sheet: SheetKey::Checkins,
            fields: fields("a"),
        });
        let again = snapshot.apply(&Action::ConfirmDequeue { seq: 999 });
        assert_eq!(again, snapshot);
    }

    #[test]
    fn hydrate_is_deterministic() {
        let cached = CachedState {
            sync_queue: Some(vec![PendingCommand {
                seq: 7,
                sheet: SheetKey::Todo,
                fields: fields("queued"),
            }]),
            signed_in: Some(true),
            ..Default::default()
        };
        let action = Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(cached),
        };
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.apply(&action), snapshot.apply(&action));
    }

    #[test]
    fn hydrate_rebuilds_next_seq_past_the_cached_queue() {
        let cached = CachedState {
            sync_queue: Some(vec![
                PendingCommand { seq: 3, sheet: SheetKey::Todo, fields: fields("a") },
                PendingCommand { seq: 9, sheet: SheetKey::Checkins, fields: fields("b") },
            ]),
            ..Default::default()
        };
        let snapshot = Snapshot::default().apply(&Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(cached),
        });
        assert_eq!(snapshot.next_seq, 10);

        let snapshot = snapshot.apply(&Action::EnqueueAppend {
            sheet: SheetKey::Todo,
            fields: fields("c"),
        });
        assert_eq!(snapshot.sync_queue.last().unwrap().seq, 10);
    }

    #[test]
    fn hydrate_applies_only_a_cached_signed_in() {
        let signed_out = CachedState {
            signed_in: Some(false),
            ..Default::default()
        };
        let snapshot = Snapshot::default().apply(&Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(signed_out),
        });
        assert_eq!(snapshot.session, Session::Unknown);

        let signed_in = CachedState {
            signed_in: Some(true),
            ..Default::default()
        };
        let snapshot = snapshot.apply(&Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(signed_in),
        });
        assert_eq!(snapshot.session, Session::SignedIn);
    }

    #[test]
    fn hydrate_with_empty_cache_leaves_defaults() {
        let snapshot = Snapshot::default().apply(&Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(CachedState::default()),
        });
        assert_eq!(snapshot.loader_status(Loader::Local), LoadStatus::Ok);
        assert!(snapshot.sync_queue.is_empty());
        assert_eq!(snapshot.search, SearchState::default());
    }

    #[test]
    fn sheets_hydrate_replaces_rows_wholesale() {
        let mut snapshot = Snapshot::default().apply(&Action::EnqueueAppend {
            sheet: SheetKey::Memberships,
            fields: fields("optimistic"),
        });

        let mut rows = SheetRows::new();
        rows.insert(SheetKey::Memberships, vec![Row::new(0, fields("remote"))]);
        let mut keys = SheetKeys::new();
        keys.insert(SheetKey::Memberships, vec![Some(ColumnKey::Name)]);
        snapshot = snapshot.apply(&Action::Hydrate {
            loader: Loader::Sheets,
            payload: HydratePayload::Sheets { rows, keys },
        });

        let rows = snapshot.sheet_rows(SheetKey::Memberships);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(ColumnKey::Name), Some("remote"));
    }

    #[test]
    fn retry_reset_only_clears_a_failure() {
        let snapshot = Snapshot::default().apply(&Action::MarkFailed {
            loader: Loader::Handshake,
        });
        let reset = snapshot.apply(&Action::RetryReset {
            loader: Loader::Handshake,
        });
        assert_eq!(reset.loader_status(Loader::Handshake), LoadStatus::NotAttempted);

        let ok = Snapshot::default().apply(&Action::Hydrate {
            loader: Loader::Handshake,
            payload: HydratePayload::None,
        });
        let still_ok = ok.apply(&Action::RetryReset {
            loader: Loader::Handshake,
        });
        assert_eq!(still_ok.loader_status(Loader::Handshake), LoadStatus::Ok);
    }

    #[test]
    fn sync_ready_needs_both_session_and_handshake() {
        let snapshot = Snapshot::default();
        assert!(!snapshot.sync_ready());

        let snapshot = snapshot.apply(&Action::SetSession { signed_in: true });
        assert!(!snapshot.sync_ready());

        let snapshot = snapshot.apply(&Action::Hydrate {
            loader: Loader::Handshake,
            payload: HydratePayload::None,
        });
        assert!(snapshot.sync_ready());

        let snapshot = snapshot.apply(&Action::SetSession { signed_in: false });
        assert!(!snapshot.sync_ready());
    }

    #[test]
    fn set_search_replaces_search_state() {
        let snapshot = Snapshot::default().apply(&Action::SetSearch {
            query: "ada".into(),
            count: 20,
        });
        assert_eq!(snapshot.search.query, "ada");
        assert_eq!(snapshot.search.count, 20);
    }
}
