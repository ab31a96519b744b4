use crate::error::{FrontdeskError, Result};
use crate::model::{business_date, ColumnKey, Row, SheetKey, Value};
use crate::sheet::format_date;
use crate::state::Snapshot;
use chrono::{DateTime, Local, NaiveDate};
use std::collections::HashSet;

/// The date/time pair stamped onto every appended row: the business date
/// (4 a.m. rollover) and the wall-clock time.
pub fn stamp(now: DateTime<Local>) -> (Value, Value) {
    (
        Value::Date(business_date(now)),
        Value::Time(now.time()),
    )
}

/// A membership row as the front desk sees it, with its check-in history
/// folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberView {
    /// Stable row identity within the memberships dataset.
    pub index: usize,
    pub person: String,
    pub name: String,
    pub phone: String,
    pub plan: String,
    pub note: String,
    /// Check-ins that were not first visits.
    pub loyalty: usize,
    pub checked_in: bool,
    pub expired: bool,
    /// Only the most recent membership row per person is actionable; older
    /// rows are display-only history.
    pub latest: bool,
}

/// Fold the memberships and checkins datasets into per-row views. Rows come
/// back in dataset order (most recent membership first, per the fetch sort).
pub fn member_views(snapshot: &Snapshot, today: NaiveDate) -> Vec<MemberView> {
    let checkins = snapshot.sheet_rows(SheetKey::Checkins);
    let mut seen: HashSet<String> = HashSet::new();

    snapshot
        .sheet_rows(SheetKey::Memberships)
        .iter()
        .map(|row| {
            let person = row.person().unwrap_or("").to_string();
            let latest = seen.insert(person.clone());

            let history: Vec<&Row> = if person.is_empty() {
                Vec::new()
            } else {
                checkins
                    .iter()
                    .filter(|c| c.person() == Some(person.as_str()))
                    .collect()
            };
            let checked_in = history
                .iter()
                .any(|c| c.date(ColumnKey::Date) == Some(today));
            let first_visits = history
                .iter()
                .filter(|c| c.text(ColumnKey::Note) == Some("NEW"))
                .count();

            let expired = row
                .date(ColumnKey::End)
                .map(|end| end < today)
                .unwrap_or(false);

            MemberView {
                index: row.index,
                person,
                name: row.text(ColumnKey::Name).unwrap_or("").to_string(),
                phone: row.text(ColumnKey::Phone).unwrap_or("").to_string(),
                plan: plan_line(row),
                note: row.text(ColumnKey::Note).unwrap_or("").to_string(),
                loyalty: history.len() - first_visits,
                checked_in,
                expired,
                latest,
            }
        })
        .collect()
}

/// "monthly, from 01/02/2024 to 03/02/2024"
fn plan_line(row: &Row) -> String {
    let mut line = row.text(ColumnKey::Plan).unwrap_or("").to_string();
    if let Some(start) = row.date(ColumnKey::Start) {
        line.push_str(&format!(", from {}", format_date(start)));
    }
    if let Some(end) = row.date(ColumnKey::End) {
        line.push_str(&format!(" to {}", format_date(end)));
    }
    line
}

/// Resolve a membership row index to a view that may be acted on.
pub fn actionable_member(
    snapshot: &Snapshot,
    index: usize,
    today: NaiveDate,
) -> Result<MemberView> {
    let views = member_views(snapshot, today);
    let view = views
        .into_iter()
        .find(|v| v.index == index)
        .ok_or_else(|| FrontdeskError::Api(format!("No membership with index {}", index)))?;
    if !view.latest {
        return Err(FrontdeskError::Api(format!(
            "Membership {} has a newer row for {}; act on the latest one",
            index,
            if view.name.is_empty() { "that person" } else { view.name.as_str() }
        )));
    }
    Ok(view)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn folds_checkin_history_into_views() {
        let snapshot = snapshot_with(
            vec![membership("m1", "Ada", "555-0100", None)],
            vec![
                checkin("m1", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "NEW"),
                checkin("m1", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "MEMBER"),
                checkin("m1", today(), "MEMBER"),
            ],
        );
        let views = member_views(&snapshot, today());
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert!(view.checked_in);
        assert_eq!(view.loyalty, 2, "first visit does not count toward loyalty");
        assert!(!view.expired);
        assert!(view.latest);
    }

    #[test]
    fn only_the_first_row_per_person_is_latest() {
        let snapshot = snapshot_with(
            vec![
                membership("m1", "Ada", "555-0100", None),
                membership("m1", "Ada", "555-0100", None),
                membership("m2", "Brin", "555-0199", None),
            ],
            vec![],
        );
        let views = member_views(&snapshot, today());
        assert!(views[0].latest);
        assert!(!views[1].latest);
        assert!(views[2].latest);
    }

    #[test]
    fn expiry_compares_against_the_business_date() {
        let yesterday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let snapshot = snapshot_with(
            vec![
                membership("m1", "Ada", "", Some(yesterday)),
                membership("m2", "Brin", "", Some(today())),
            ],
            vec![],
        );
        let views = member_views(&snapshot, today());
        assert!(views[0].expired);
        assert!(!views[1].expired, "expiry day itself still counts");
    }

    #[test]
    fn plan_line_includes_dates_when_present() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let snapshot = snapshot_with(vec![membership("m1", "Ada", "", Some(end))], vec![]);
        let views = member_views(&snapshot, today());
        assert_eq!(views[0].plan, "monthly, from 01/02/2024 to 03/02/2024");
    }

    #[test]
    fn actionable_member_rejects_unknown_and_stale_rows() {
        let snapshot = snapshot_with(
            vec![
                membership("m1", "Ada", "", None),
                membership("m1", "Ada", "", None),
            ],
            vec![],
        );
        assert!(actionable_member(&snapshot, 7, today()).is_err());
        assert!(actionable_member(&snapshot, 0, today()).is_ok());
        assert!(actionable_member(&snapshot, 1, today()).is_err());
    }
}
