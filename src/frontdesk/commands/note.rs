use super::helpers::{actionable_member, stamp};
use super::{CmdMessage, CmdResult};
use crate::error::{FrontdeskError, Result};
use crate::model::{business_date, ColumnKey, Fields, SheetKey, Value};
use crate::state::{Action, Snapshot};
use chrono::{DateTime, Local};

/// Leave a note for the host against a member's record.
pub fn run(
    snapshot: &Snapshot,
    index: usize,
    text: &str,
    now: DateTime<Local>,
) -> Result<CmdResult> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FrontdeskError::Api("Note cannot be empty".into()));
    }
    let today = business_date(now);
    let view = actionable_member(snapshot, index, today)?;

    let (date, time) = stamp(now);
    let todo = Fields::from([
        (ColumnKey::Date, date),
        (ColumnKey::Time, time),
        (ColumnKey::Person, Value::Id(view.person.clone())),
        (ColumnKey::Name, Value::Text(view.name.clone())),
        (ColumnKey::Phone, Value::Phone(view.phone.clone())),
        (ColumnKey::Todo, Value::Text(format!("NOTE: {}", text))),
    ]);

    let mut result = CmdResult::default().with_actions(vec![Action::EnqueueAppend {
        sheet: SheetKey::Todo,
        fields: todo,
    }]);
    result.add_message(CmdMessage::success("Note left for the host"));
    Ok(result)
}
