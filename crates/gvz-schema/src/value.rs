//! Raw cell values
//!
//! A [`CellValue`] is what callers hand to row encoding. Date-times are local
//! wall-clock values; anything carrying a timezone is converted to local time
//! on the way in.

use crate::errors::{Result, SchemaError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, TimeDelta};
use serde_json::Value;
use std::fmt;

/// JSON object key for a tagged local date-time
pub const DATETIME_TAG: &str = "$datetime";
/// JSON object key for a tagged duration in milliseconds
pub const DURATION_MS_TAG: &str = "$duration_ms";

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
}

impl CellValue {
    /// Convert one JSON scalar or tagged object.
    ///
    /// Arrays are rejected: a nested array inside a row is a shape error.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(CellValue::Empty),
            Value::Bool(b) => Ok(CellValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(CellValue::Int(i)),
                None => n
                    .as_f64()
                    .map(CellValue::Float)
                    .ok_or_else(|| SchemaError::InvalidValue(format!("number {} out of range", n))),
            },
            Value::String(s) => Ok(CellValue::Text(s.clone())),
            Value::Array(_) => Err(SchemaError::RowShape(
                "nested array inside a row".to_string(),
            )),
            Value::Object(map) => {
                if let Some(raw) = map.get(DATETIME_TAG) {
                    let text = raw.as_str().ok_or_else(|| {
                        SchemaError::InvalidValue(format!("{} must be a string", DATETIME_TAG))
                    })?;
                    return parse_local_datetime(text).map(CellValue::DateTime);
                }
                if let Some(raw) = map.get(DURATION_MS_TAG) {
                    let ms = raw.as_i64().ok_or_else(|| {
                        SchemaError::InvalidValue(format!("{} must be an integer", DURATION_MS_TAG))
                    })?;
                    return TimeDelta::try_milliseconds(ms)
                        .map(CellValue::Duration)
                        .ok_or_else(|| {
                            SchemaError::InvalidValue(format!("duration {}ms out of range", ms))
                        });
                }
                Err(SchemaError::InvalidValue(format!(
                    "unsupported object {}, expected {{\"{}\": ...}} or {{\"{}\": ...}}",
                    value, DATETIME_TAG, DURATION_MS_TAG
                )))
            }
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Int(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "boolean",
            CellValue::DateTime(_) => "datetime",
            CellValue::Duration(_) => "duration",
        }
    }
}

/// Parse `YYYY-MM-DD[THH:MM[:SS[.fff]]]` as a local wall-clock time
pub fn parse_local_datetime(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SchemaError::InvalidValue(format!("unparseable date-time {:?}", text)))
}

/// The string form used for pattern checks and string columns
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f")),
            CellValue::Duration(d) => write!(f, "{}ms", d.num_milliseconds()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CellValue {
    fn from(dt: DateTime<Tz>) -> Self {
        CellValue::DateTime(dt.with_timezone(&Local).naive_local())
    }
}

impl From<TimeDelta> for CellValue {
    fn from(d: TimeDelta) -> Self {
        CellValue::Duration(d)
    }
}

impl From<std::time::Duration> for CellValue {
    /// Whole milliseconds, saturating at [`TimeDelta::MAX`]
    fn from(d: std::time::Duration) -> Self {
        let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        CellValue::Duration(TimeDelta::try_milliseconds(ms).unwrap_or(TimeDelta::MAX))
    }
}
