use super::helpers::{actionable_member, stamp};
use super::{CmdMessage, CmdResult};
use crate::error::{FrontdeskError, Result};
use crate::model::{business_date, person_code, ColumnKey, Fields, SheetKey, Value};
use crate::state::{Action, Snapshot};
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinKind {
    Member,
    Guest,
}

/// Check in somebody who isn't on the roster yet: a to-do for the host to
/// collect their details, plus the check-in itself, under a fresh person
/// code that ties the two rows together.
pub fn new_person(now: DateTime<Local>) -> Result<CmdResult> {
    let person = person_code();
    let (date, time) = stamp(now);

    let todo = Fields::from([
        (ColumnKey::Date, date.clone()),
        (ColumnKey::Time, time.clone()),
        (ColumnKey::Person, Value::Id(person.clone())),
        (ColumnKey::Name, Value::Text(String::new())),
        (ColumnKey::Phone, Value::Phone(String::new())),
        (ColumnKey::Todo, Value::Text("NEW PERSON".into())),
    ]);
    let visit = Fields::from([
        (ColumnKey::Person, Value::Id(person.clone())),
        (ColumnKey::Date, date),
        (ColumnKey::Time, time),
        (ColumnKey::Note, Value::Text("NEW".into())),
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
        "Checked in new person {}",
        person
    )));
    Ok(result)
}

/// Check an existing member (or, for an expired membership, a guest) in.
pub fn member(
    snapshot: &Snapshot,
    index: usize,
    kind: CheckinKind,
    now: DateTime<Local>,
) -> Result<CmdResult> {
    let today = business_date(now);
    let view = actionable_member(snapshot, index, today)?;

    if view.checked_in {
        return Err(FrontdeskError::Api(format!(
            "{} is already checked in today",
            display_name(&view.name)
        )));
    }
    match kind {
        CheckinKind::Member if view.expired => {
            return Err(FrontdeskError::Api(format!(
                "Membership for {} expired; renew it or check in as guest",
                display_name(&view.name)
            )));
        }
        CheckinKind::Guest if !view.expired => {
            return Err(FrontdeskError::Api(
                "Guest check-in is for expired memberships".into(),
            ));
        }
        _ => {}
    }

    let (date, time) = stamp(now);
    let note = match kind {
        CheckinKind::Member => "MEMBER",
        CheckinKind::Guest => "GUEST",
    };
    let visit = Fields::from([
        (ColumnKey::Person, Value::Id(view.person.clone())),
        (ColumnKey::Date, date),
        (ColumnKey::Time, time),
        (ColumnKey::Note, Value::Text(note.into())),
    ]);

    let mut result = CmdResult::default().with_actions(vec![Action::EnqueueAppend {
        sheet: SheetKey::Checkins,
        fields: visit,
    }]);
    result.add_message(CmdMessage::success(format!(
        "Checked in {}",
        display_name(&view.name)
    )));
    Ok(result)
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "member" } else { name }
}
