//! Parsing and formatting of raw spreadsheet values.
//!
//! Stateless transforms between the remote API's string grid and typed
//! [`Row`]s: header labels resolve through the heading table, cells coerce by
//! declared type, and fetched rows sort by the fixed priority list. The
//! inverse direction formats a row payload into the string cells an append
//! call wants, following the dataset's previously-learned column order.

use crate::model::{
    heading_for_label, ColumnKey, Fields, Row, Value, ValueType, SORT_BY,
};
use chrono::{NaiveDate, NaiveTime};
use std::cmp::Ordering;

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%m/%d/%y"];
const TIME_FORMATS: [&str; 3] = ["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S"];

/// Result of parsing one raw sheet block: typed rows plus the column order
/// observed in the header row (unrecognized columns kept as `None` so later
/// appends leave those cells blank).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub rows: Vec<Row>,
    pub keys: Vec<Option<ColumnKey>>,
}

/// Parse a raw tabular block. The header labels come from the last heading
/// row; a duplicated label keeps its first occurrence. Rows with no
/// recognized columns are skipped. `index` reflects sheet order at parse
/// time, before sorting.
pub fn parse_sheet(values: &[Vec<String>], heading_rows: usize) -> ParsedSheet {
    if values.len() <= heading_rows {
        return ParsedSheet::default();
    }

    let headings: Vec<Option<&'static crate::model::Heading>> = values[heading_rows - 1]
        .iter()
        .map(|label| heading_for_label(label))
        .collect();

    let mut rows = Vec::new();
    for raw in &values[heading_rows..] {
        if raw.is_empty() {
            continue;
        }
        let mut fields = Fields::new();
        for (offset, cell) in raw.iter().enumerate() {
            let Some(h) = headings.get(offset).copied().flatten() else {
                continue;
            };
            // first occurrence wins
            if fields.contains_key(&h.key) {
                continue;
            }
            if let Some(value) = parse_value(cell, h.kind) {
                fields.insert(h.key, value);
            }
        }
        if fields.is_empty() {
            continue;
        }
        rows.push(Row::new(rows.len(), fields));
    }
    sort_rows(&mut rows);

    let keys = headings.iter().map(|h| h.map(|h| h.key)).collect();
    ParsedSheet { rows, keys }
}

/// Coerce one raw cell by its column's declared type. Empty dates and times
/// are absent, not errors; unparseable numbers become 0.
pub fn parse_value(raw: &str, kind: ValueType) -> Option<Value> {
    match kind {
        ValueType::Text => Some(Value::Text(raw.trim().to_string())),
        ValueType::Phone => Some(Value::Phone(raw.trim().to_string())),
        ValueType::Id => Some(Value::Id(raw.trim().to_string())),
        ValueType::Number => {
            let cleaned = raw.replacen('$', "", 1);
            Some(Value::Number(cleaned.trim().parse().unwrap_or(0.0)))
        }
        ValueType::Date => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_date(trimmed).map(Value::Date)
        }
        ValueType::Time => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_time(trimmed).map(Value::Time)
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M:%S %p").to_string()
}

/// Format one cell for an append call. Ids get a leading apostrophe so the
/// remote store keeps them as text; absent values become the empty string.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Date(d)) => format_date(*d),
        Some(Value::Time(t)) => format_time(*t),
        Some(Value::Id(v)) => {
            if v.is_empty() {
                String::new()
            } else {
                format!("'{}", v)
            }
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Text(v)) | Some(Value::Phone(v)) => v.clone(),
    }
}

/// Lay a row payload out in the dataset's learned column order. Unrecognized
/// columns stay blank.
pub fn append_values(keys: &[Option<ColumnKey>], fields: &Fields) -> Vec<String> {
    keys.iter()
        .map(|key| match key {
            None => String::new(),
            Some(key) => format_value(fields.get(key)),
        })
        .collect()
}

/// Sort rows by [`SORT_BY`] descending; a later key breaks ties for equal
/// values of an earlier key, and a row missing a key orders as the smallest
/// possible value for that comparison (so it lands last).
pub fn sort_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        for key in SORT_BY {
            match b.get(key).cmp(&a.get(key)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    });
}
