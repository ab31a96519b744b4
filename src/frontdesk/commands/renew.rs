use super::helpers::{actionable_member, stamp};
use super::{CmdMessage, CmdResult};
use crate::error::{FrontdeskError, Result};
use crate::model::{business_date, ColumnKey, Fields, SheetKey, Value};
use crate::state::{Action, Snapshot};
use chrono::{DateTime, Local};

/// Renew an expired membership: a to-do carrying the member's contact
/// details for the host, plus the member's check-in for today.
pub fn run(snapshot: &Snapshot, index: usize, now: DateTime<Local>) -> Result<CmdResult> {
    let today = business_date(now);
    let view = actionable_member(snapshot, index, today)?;

    if !view.expired {
        return Err(FrontdeskError::Api(format!(
            "Membership for {} has not expired",
            view.name
        )));
    }

    let (date, time) = stamp(now);
    let todo = Fields::from([
        (ColumnKey::Date, date.clone()),
        (ColumnKey::Time, time.clone()),
        (ColumnKey::Person, Value::Id(view.person.clone())),
        (ColumnKey::Name, Value::Text(view.name.clone())),
        (ColumnKey::Phone, Value::Phone(view.phone.clone())),
        (ColumnKey::Todo, Value::Text("RENEW MEMBERSHIP".into())),
    ]);
    let visit = Fields::from([
        (ColumnKey::Person, Value::Id(view.person.clone())),
        (ColumnKey::Date, date),
        (ColumnKey::Time, time),
        (ColumnKey::Note, Value::Text("MEMBER".into())),
    ]);

    let mut result = CmdResult::default().with_actions(vec![
        Action::EnqueueAppend {
            sheet: SheetKey::Todo,
            fields: todo,
        },
        Action::EnqueueAppend {
            sheet: SheetKey::Checkins,
            fields: visit,
        },
    ]);
    result.add_message(CmdMessage::success(format!(
        "Renewal noted; checked in {}",
        view.name
    )));
    Ok(result)
}
