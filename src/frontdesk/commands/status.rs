use super::CmdResult;
use crate::error::Result;
use crate::model::{ColumnKey, LoadStatus, Loader, Session, SheetKey};
use crate::state::Snapshot;
use chrono::NaiveDate;

/// The one-line picture the front desk glances at: how far boot/sync has
/// gotten, how much is still saving, and today's head count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// The stage still loading, or `None` once everything is live.
    pub stage: Option<String>,
    pub session: Session,
    /// Queued writes not yet confirmed remotely.
    pub pending: usize,
    pub total_today: usize,
    pub members_today: usize,
    pub new_today: usize,
}

pub fn run(snapshot: &Snapshot, today: NaiveDate) -> Result<CmdResult> {
    let todays: Vec<_> = snapshot
        .sheet_rows(SheetKey::Checkins)
        .iter()
        .filter(|row| row.date(ColumnKey::Date) == Some(today))
        .collect();
    let total_today = todays.len();
    let new_today = todays
        .iter()
        .filter(|row| row.text(ColumnKey::Note) == Some("NEW"))
        .count();

    let report = StatusReport {
        stage: stage(snapshot),
        session: snapshot.session,
        pending: snapshot.sync_queue.len(),
        total_today,
        members_today: total_today - new_today,
        new_today,
    };
    Ok(CmdResult::default().with_status(report))
}

fn stage(snapshot: &Snapshot) -> Option<String> {
    let status = |l: Loader| snapshot.loader_status(l);
    let label = if status(Loader::Local) == LoadStatus::NotAttempted {
        "Loading cache"
    } else if status(Loader::Client) != LoadStatus::Ok {
        "Starting client"
    } else if status(Loader::Auth) != LoadStatus::Ok {
        "Loading credentials"
    } else if status(Loader::Handshake) != LoadStatus::Ok {
        "Connecting to remote"
    } else if snapshot.session == Session::Unknown {
        "Loading sign in"
    } else if snapshot.session == Session::SignedOut {
        "Not signed in"
    } else if status(Loader::Sheets) != LoadStatus::Ok {
        "Loading data"
    } else {
        return None;
    };
    Some(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{checkin, snapshot_with};
    use crate::state::{Action, HydratePayload};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn report(snapshot: &Snapshot) -> StatusReport {
        run(snapshot, today()).unwrap().status.unwrap()
    }

    #[test]
    fn counts_todays_checkins_by_kind() {
        let yesterday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let snapshot = snapshot_with(
            vec![],
            vec![
                checkin("m1", today(), "MEMBER"),
                checkin("p1", today(), "NEW"),
                checkin("m2", yesterday, "MEMBER"),
            ],
        );
        let report = report(&snapshot);
        assert_eq!(report.total_today, 2);
        assert_eq!(report.members_today, 1);
        assert_eq!(report.new_today, 1);
        assert_eq!(report.pending, 3, "all three optimistic rows still queued");
    }

    #[test]
    fn stage_walks_the_loader_chain() {
        let mut snapshot = Snapshot::default();
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Loading cache"));

        snapshot = snapshot.apply(&Action::Hydrate {
            loader: Loader::Local,
            payload: HydratePayload::Cache(Default::default()),
        });
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Starting client"));

        for loader in [Loader::Client, Loader::Auth, Loader::Handshake] {
            snapshot = snapshot.apply(&Action::Hydrate {
                loader,
                payload: HydratePayload::None,
            });
        }
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Loading sign in"));

        snapshot = snapshot.apply(&Action::SetSession { signed_in: false });
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Not signed in"));

        snapshot = snapshot.apply(&Action::SetSession { signed_in: true });
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Loading data"));

        snapshot = snapshot.apply(&Action::Hydrate {
            loader: Loader::Sheets,
            payload: HydratePayload::Sheets {
                rows: Default::default(),
                keys: Default::default(),
            },
        });
        assert_eq!(report(&snapshot).stage, None);
    }

    #[test]
    fn a_failed_cache_read_does_not_stick_on_the_cache_stage() {
        let snapshot = Snapshot::default().apply(&Action::MarkFailed {
            loader: Loader::Local,
        });
        assert_eq!(report(&snapshot).stage.as_deref(), Some("Starting client"));
    }
}
