//! Column validator
//!
//! Turns a [`CellValue`] into the string the Sheets API receives with
//! `valueInputOption=USER_ENTERED`, or rejects it with a reason.

use crate::datatype::Datatype;
use crate::value::CellValue;
use chrono::{NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static UNSIGNED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());

static SIGNED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

/// Sign handling for numeric columns.
///
/// `Compatible` keeps the long-standing patterns: `number` is unsigned and
/// `unumber` admits a leading `-` (the sheet's own `>= 0` rule still rejects
/// negatives on entry). `Corrected` swaps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    #[default]
    Compatible,
    Corrected,
}

/// Why a value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCell {
    pub reason: String,
}

impl InvalidCell {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    policy: NumericPolicy,
}

impl Validator {
    pub fn new(policy: NumericPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    fn numeric_pattern(&self, datatype: &Datatype) -> &'static Regex {
        match (datatype, self.policy) {
            (Datatype::UNumber { .. }, NumericPolicy::Compatible)
            | (Datatype::Number { .. }, NumericPolicy::Corrected) => &*SIGNED_DECIMAL,
            _ => &*UNSIGNED_DECIMAL,
        }
    }

    /// Validate and encode one cell
    pub fn validate(&self, datatype: &Datatype, value: &CellValue) -> Result<String, InvalidCell> {
        match datatype {
            Datatype::String => Ok(value.to_string()),
            Datatype::Number { .. } | Datatype::UNumber { .. } => {
                let rendered = match value {
                    CellValue::Text(_) | CellValue::Int(_) | CellValue::Float(_) => {
                        value.to_string()
                    }
                    other => {
                        return Err(InvalidCell::new(format!(
                            "expected a number, got {}",
                            other.type_name()
                        )))
                    }
                };
                if self.numeric_pattern(datatype).is_match(&rendered) {
                    Ok(rendered)
                } else {
                    Err(InvalidCell::new(format!(
                        "not a valid {} value",
                        datatype.tag()
                    )))
                }
            }
            Datatype::Date => {
                expect_datetime(value).map(|dt| dt.format("%Y-%m-%d").to_string())
            }
            Datatype::Time => {
                expect_datetime(value).map(|dt| dt.format("%H:%M:%S%.3f").to_string())
            }
            Datatype::DateTime => {
                expect_datetime(value).map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            }
            Datatype::Duration => match value {
                CellValue::Duration(d) => format_duration(*d),
                // elapsed time since the epoch, read as wall clock
                CellValue::DateTime(dt) => {
                    format_duration(dt.signed_duration_since(NaiveDateTime::default()))
                }
                other => Err(InvalidCell::new(format!(
                    "expected a duration, got {}",
                    other.type_name()
                ))),
            },
            Datatype::Boolean => match value {
                CellValue::Bool(b) => Ok(b.to_string()),
                CellValue::Text(s) if s == "true" || s == "false" => Ok(s.clone()),
                other => Err(InvalidCell::new(format!(
                    "expected true or false, got {:?}",
                    other.to_string()
                ))),
            },
        }
    }
}

/// Validate with the default policy
pub fn validate(datatype: &Datatype, value: &CellValue) -> Result<String, InvalidCell> {
    Validator::default().validate(datatype, value)
}

fn expect_datetime(value: &CellValue) -> Result<NaiveDateTime, InvalidCell> {
    value.as_datetime().ok_or_else(|| {
        InvalidCell::new(format!("expected a date-time, got {}", value.type_name()))
    })
}

/// `HH:MM:SS.mmm` with hours counting past 24
pub fn format_duration(duration: TimeDelta) -> Result<String, InvalidCell> {
    let total_ms = duration.num_milliseconds();
    if total_ms < 0 {
        return Err(InvalidCell::new("negative durations are not supported"));
    }
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    Ok(format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours, minutes, seconds, millis
    ))
}
