//! Core data types: the sheet registry, typed cell values, rows, and the
//! field types that make up the process-wide snapshot.
//!
//! The registry (`SHEETS`, `HEADINGS`, `SORT_BY`) is the single source of
//! truth for which remote ranges exist, how their header labels map to typed
//! columns, and how rows are ordered after a fetch.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Named logical tables, each backed by a remote sheet range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SheetKey {
    Memberships,
    Todo,
    Checkins,
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKey::Memberships => write!(f, "memberships"),
            SheetKey::Todo => write!(f, "todo"),
            SheetKey::Checkins => write!(f, "checkins"),
        }
    }
}

/// One entry in the sheet registry: key, remote tab title, and how many
/// heading rows precede the data.
#[derive(Debug, Clone, Copy)]
pub struct Sheet {
    pub key: SheetKey,
    pub title: &'static str,
    pub heading_rows: usize,
}

impl Sheet {
    /// The A1 range covering the whole tab.
    pub fn range(&self) -> String {
        format!("{}!A:ZZ", self.title)
    }
}

pub const SHEETS: [Sheet; 3] = [
    Sheet {
        key: SheetKey::Memberships,
        title: "Memberships",
        heading_rows: 2,
    },
    Sheet {
        key: SheetKey::Todo,
        title: "To do",
        heading_rows: 2,
    },
    Sheet {
        key: SheetKey::Checkins,
        title: "Checkins",
        heading_rows: 2,
    },
];

pub fn sheet(key: SheetKey) -> &'static Sheet {
    SHEETS
        .iter()
        .find(|s| s.key == key)
        .expect("sheet registry covers every SheetKey")
}

/// Typed column keys. Every recognized spreadsheet column maps to one of
/// these; the mapping from remote header label lives in [`HEADINGS`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKey {
    Person,
    Name,
    Phone,
    Plan,
    Price,
    Start,
    End,
    Note,
    Type,
    Months,
    Date,
    Time,
    Todo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Id,
    Text,
    Phone,
    Number,
    Date,
    Time,
}

/// Column key, remote header label, cell value type.
#[derive(Debug, Clone, Copy)]
pub struct Heading {
    pub key: ColumnKey,
    pub label: &'static str,
    pub kind: ValueType,
}

pub const HEADINGS: [Heading; 13] = [
    Heading { key: ColumnKey::Person, label: "PERSON", kind: ValueType::Id },
    Heading { key: ColumnKey::Name, label: "NAME", kind: ValueType::Text },
    Heading { key: ColumnKey::Phone, label: "PHONE", kind: ValueType::Phone },
    Heading { key: ColumnKey::Plan, label: "PLAN", kind: ValueType::Text },
    Heading { key: ColumnKey::Price, label: "PRICE", kind: ValueType::Number },
    Heading { key: ColumnKey::Start, label: "START", kind: ValueType::Date },
    Heading { key: ColumnKey::End, label: "END", kind: ValueType::Date },
    Heading { key: ColumnKey::Note, label: "NOTE", kind: ValueType::Text },
    Heading { key: ColumnKey::Type, label: "TYPE", kind: ValueType::Text },
    Heading { key: ColumnKey::Months, label: "MONTHS", kind: ValueType::Number },
    Heading { key: ColumnKey::Date, label: "DATE", kind: ValueType::Date },
    Heading { key: ColumnKey::Time, label: "TIME", kind: ValueType::Time },
    Heading { key: ColumnKey::Todo, label: "TODO", kind: ValueType::Text },
];

pub fn heading(key: ColumnKey) -> &'static Heading {
    HEADINGS
        .iter()
        .find(|h| h.key == key)
        .expect("heading table covers every ColumnKey")
}

pub fn heading_for_label(label: &str) -> Option<&'static Heading> {
    HEADINGS.iter().find(|h| h.label == label)
}

/// Sort priority for fetched rows, applied descending with later keys as
/// tie-breaks.
pub const SORT_BY: [ColumnKey; 3] = [ColumnKey::Start, ColumnKey::Date, ColumnKey::Time];

/// Number of membership rows shown per search page.
pub const PAGE_SIZE: usize = 10;

/// A typed cell value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Id(String),
    Text(String),
    Phone(String),
    Number(f64),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Id(_) => 0,
            Value::Text(_) => 1,
            Value::Phone(_) => 2,
            Value::Number(_) => 3,
            Value::Date(_) => 4,
            Value::Time(_) => 5,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Id(s) | Value::Text(s) | Value::Phone(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

// Total ordering so rows sort deterministically; Number uses total_cmp.
// Values of mismatched variants (a mistyped column) fall back to rank order.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Id(a), Value::Id(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Phone(a), Value::Phone(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// Row payload: column key to typed value.
pub type Fields = BTreeMap<ColumnKey, Value>;

/// One dataset row. `index` is the row's position within its dataset at the
/// moment of insertion; it is the row's stable identity and is never reused
/// (rows are never removed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub fields: Fields,
}

impl Row {
    pub fn new(index: usize, fields: Fields) -> Self {
        Self { index, fields }
    }

    pub fn get(&self, key: ColumnKey) -> Option<&Value> {
        self.fields.get(&key)
    }

    pub fn text(&self, key: ColumnKey) -> Option<&str> {
        self.fields.get(&key).and_then(Value::as_str)
    }

    pub fn date(&self, key: ColumnKey) -> Option<NaiveDate> {
        self.fields.get(&key).and_then(Value::as_date)
    }

    pub fn person(&self) -> Option<&str> {
        self.text(ColumnKey::Person)
    }
}

/// A queued, not-yet-confirmed append destined for the remote store.
///
/// `seq` is assigned at enqueue time and is the identity used to confirm the
/// write later; it survives cache round-trips so a reload keeps draining the
/// same queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCommand {
    pub seq: u64,
    pub sheet: SheetKey,
    #[serde(rename = "row")]
    pub fields: Fields,
}

/// Named asynchronous setup/fetch steps with tri-state status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Local,
    Client,
    Auth,
    Handshake,
    Sheets,
}

pub const LOADERS: [Loader; 5] = [
    Loader::Local,
    Loader::Client,
    Loader::Auth,
    Loader::Handshake,
    Loader::Sheets,
];

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loader::Local => write!(f, "local"),
            Loader::Client => write!(f, "client"),
            Loader::Auth => write!(f, "auth"),
            Loader::Handshake => write!(f, "handshake"),
            Loader::Sheets => write!(f, "sheets"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    NotAttempted,
    Ok,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    Unknown,
    SignedIn,
    SignedOut,
}

impl Session {
    pub fn is_signed_in(self) -> bool {
        self == Session::SignedIn
    }

    /// The cached representation: true / false / null.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Session::Unknown => None,
            Session::SignedIn => Some(true),
            Session::SignedOut => Some(false),
        }
    }
}

/// Current search query and how many matches are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    #[serde(rename = "search")]
    pub query: String,
    pub count: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            count: PAGE_SIZE,
        }
    }
}

/// Generate a short person code: five lowercase letters.
pub fn person_code() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(5)
        .map(|b| char::from(b'a' + b % 26))
        .collect()
}

/// The venue's day rolls over at 4 a.m.: a 2 a.m. check-in still belongs to
/// the previous calendar date.
pub fn business_date(now: DateTime<Local>) -> NaiveDate {
    (now - Duration::hours(4)).date_naive()
}
