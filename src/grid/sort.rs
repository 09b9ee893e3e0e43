//! Field-based sort comparators.
//!
//! `sort_by(field, kind)` builds a comparator over any item exposing named fields. Values
//! that are missing or do not parse for the requested kind always sort after the ones that
//! do, so a partially populated dataset keeps its well-formed items together.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Comparator over items.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// A field value as seen by the sorter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Textual value.
    Text(Cow<'a, str>),
    /// Numeric value.
    Number(f64),
}

/// Items whose fields can be looked up by name.
pub trait FieldAccess {
    /// Value of `name`, if present.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl FieldAccess for serde_json::Value {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self.get(name)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(FieldValue::Text(Cow::Borrowed(s))),
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            other => Some(FieldValue::Text(Cow::Owned(other.to_string()))),
        }
    }
}

/// How a field is interpreted for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Case-insensitive text order.
    String,
    /// Numeric order; numeric strings are accepted.
    Number,
    /// Chronological order of RFC 3339 timestamps, `YYYY-MM-DD` dates, or epoch millis.
    Date,
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
        })
    }
}

impl FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            other => Err(format!("unknown sort kind {other:?} (string, number, date)")),
        }
    }
}

/// A `(field, kind)` sort request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct SortSpec {
    /// Field name.
    pub field: String,
    /// Interpretation.
    pub kind: SortKind,
}

impl SortSpec {
    /// Sort request for `field` interpreted as `kind`.
    pub fn new(field: impl Into<String>, kind: SortKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Compare two items by this spec.
    pub fn compare<T: FieldAccess>(&self, a: &T, b: &T) -> Ordering {
        let key_a = sort_key(a.field(&self.field), self.kind);
        let key_b = sort_key(b.field(&self.field), self.kind);
        match (key_a, key_b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Boxed comparator for this spec.
    pub fn comparator<T: FieldAccess + 'static>(&self) -> Comparator<T> {
        let spec = self.clone();
        Box::new(move |a: &T, b: &T| spec.compare(a, b))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.kind)
    }
}

/// Parses `FIELD:KIND`; a bare `FIELD` sorts as a string.
impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, kind) = match s.split_once(':') {
            Some((field, kind)) => (field, kind.parse()?),
            None => (s, SortKind::String),
        };
        if field.trim().is_empty() {
            return Err(format!("missing field name in {s:?}"));
        }
        Ok(Self::new(field.trim(), kind))
    }
}

/// Normalized, totally ordered key for one field value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String, String),
    Number(OrderedF64),
    Instant(i64),
}

#[derive(Debug, Clone, Copy)]
struct OrderedF64(f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn sort_key(value: Option<FieldValue<'_>>, kind: SortKind) -> Option<SortKey> {
    let value = value?;
    match kind {
        SortKind::String => {
            let text = match value {
                FieldValue::Text(text) => text.into_owned(),
                FieldValue::Number(n) => n.to_string(),
            };
            Some(SortKey::Text(text.to_lowercase(), text))
        }
        SortKind::Number => {
            let n = match value {
                FieldValue::Number(n) => n,
                FieldValue::Text(text) => text.trim().parse::<f64>().ok()?,
            };
            (!n.is_nan()).then_some(SortKey::Number(OrderedF64(n)))
        }
        SortKind::Date => match value {
            FieldValue::Number(millis) if millis.is_finite() => {
                Some(SortKey::Instant(millis as i64))
            }
            FieldValue::Number(_) => None,
            FieldValue::Text(text) => parse_date_millis(&text).map(SortKey::Instant),
        },
    }
}

/// Milliseconds since the Unix epoch for the date formats the sorter understands.
pub fn parse_date_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
