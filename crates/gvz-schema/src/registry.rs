//! Datatype registry
//!
//! Maps every [`Datatype`] to the Sheets cell JSON that expresses it
//! (`userEnteredFormat.numberFormat` and/or `dataValidation`) and maps an
//! observed cell back to a datatype.
//!
//! Decoding compares normalized forms by exact equality. Normalization keeps
//! only the two format keys, replaces numeric patterns with a placeholder
//! (decimals are parsed separately), treats a missing pattern as `""` and
//! forces `strict` to `true`.

use crate::datatype::Datatype;
use crate::errors::{Result, SchemaError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const NUMBER_FORMAT_FIELD: &str = "userEnteredFormat.numberFormat";
pub const DATA_VALIDATION_FIELD: &str = "dataValidation";

const NUMBER_PATTERN_PLACEHOLDER: &str = "<number>";

/// Cell JSON plus the field paths an update must name to write it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFormatSpec {
    pub cell: Value,
    pub fields: Vec<String>,
}

impl CellFormatSpec {
    /// Comma-joined field mask for a `repeatCell` request
    pub fn fields_mask(&self) -> String {
        self.fields.join(",")
    }
}

/// Number pattern for `decimals` places: `0`, `0.0`, `0.00`, ...
pub fn number_pattern(decimals: u32) -> String {
    if decimals == 0 {
        "0".to_string()
    } else {
        format!("0.{}", "0".repeat(decimals as usize))
    }
}

/// Decimal places of a number pattern: the run of `0`/`#` after the last `.`
pub fn parse_decimals(pattern: &str) -> u32 {
    match pattern.rfind('.') {
        Some(dot) => pattern[dot + 1..]
            .chars()
            .take_while(|c| *c == '0' || *c == '#')
            .count() as u32,
        None => 0,
    }
}

fn number_format(kind: &str, pattern: &str) -> Value {
    json!({ "type": kind, "pattern": pattern })
}

/// Canonical cell format for a datatype
pub fn encode(datatype: Datatype) -> CellFormatSpec {
    let format_only = |number_format: Value| CellFormatSpec {
        cell: json!({ "userEnteredFormat": { "numberFormat": number_format } }),
        fields: vec![NUMBER_FORMAT_FIELD.to_string()],
    };

    match datatype {
        Datatype::String => format_only(number_format("TEXT", "")),
        Datatype::Number { decimals } => {
            format_only(number_format("NUMBER", &number_pattern(decimals)))
        }
        Datatype::UNumber { decimals } => CellFormatSpec {
            cell: json!({
                "userEnteredFormat": {
                    "numberFormat": number_format("NUMBER", &number_pattern(decimals))
                },
                "dataValidation": {
                    "condition": {
                        "type": "NUMBER_GREATER_THAN_EQ",
                        "values": [{ "userEnteredValue": "0" }]
                    },
                    "strict": true
                }
            }),
            fields: vec![
                NUMBER_FORMAT_FIELD.to_string(),
                DATA_VALIDATION_FIELD.to_string(),
            ],
        },
        Datatype::Date => format_only(number_format("DATE", "yyyy-mm-dd")),
        Datatype::Time => format_only(number_format("TIME", "hh:mm:ss.000")),
        Datatype::DateTime => {
            format_only(number_format("DATE_TIME", "yyyy-mm-dd hh:mm:ss.000"))
        }
        Datatype::Duration => format_only(number_format("TIME", "[hh]:[mm]:[ss].000")),
        Datatype::Boolean => CellFormatSpec {
            cell: json!({
                "dataValidation": {
                    "condition": { "type": "BOOLEAN" },
                    "strict": true
                }
            }),
            fields: vec![DATA_VALIDATION_FIELD.to_string()],
        },
    }
}

/// Encode from a raw tag, failing with `UnknownType` outside the fixed set
pub fn encode_tag(tag: &str, decimals: Option<u32>) -> Result<CellFormatSpec> {
    Ok(encode(Datatype::new(tag, decimals)?))
}

fn normalize(cell: &Value) -> Value {
    let mut normalized = Map::new();

    if let Some(Value::Object(format)) = cell.pointer("/userEnteredFormat/numberFormat") {
        let mut format = format.clone();
        let is_number = format.get("type").and_then(Value::as_str) == Some("NUMBER");
        let pattern = if is_number {
            NUMBER_PATTERN_PLACEHOLDER.to_string()
        } else {
            format
                .get("pattern")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        format.insert("pattern".to_string(), Value::String(pattern));
        normalized.insert(
            "userEnteredFormat".to_string(),
            json!({ "numberFormat": format }),
        );
    }

    if let Some(Value::Object(validation)) = cell.get("dataValidation") {
        let mut validation = validation.clone();
        validation.insert("strict".to_string(), Value::Bool(true));
        normalized.insert("dataValidation".to_string(), Value::Object(validation));
    }

    Value::Object(normalized)
}

static NORMALIZED_ENTRIES: Lazy<Vec<(Datatype, Value)>> = Lazy::new(|| {
    Datatype::prototypes()
        .map(|datatype| (datatype, normalize(&encode(datatype).cell)))
        .collect()
});

/// Datatype expressed by an observed cell.
///
/// `Ok(None)` means no registry entry matches, which is a normal outcome for
/// sheets formatted by hand.
pub fn decode(observed: &Value) -> Result<Option<Datatype>> {
    let observed_normalized = normalize(observed);
    let matches: Vec<Datatype> = NORMALIZED_ENTRIES
        .iter()
        .filter(|(_, canonical)| *canonical == observed_normalized)
        .map(|(datatype, _)| *datatype)
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [datatype] if datatype.is_numeric() => {
            let pattern = observed
                .pointer("/userEnteredFormat/numberFormat/pattern")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(Some(datatype.with_decimals(parse_decimals(pattern))))
        }
        [datatype] => Ok(Some(*datatype)),
        _ => Err(SchemaError::RegistryConflict {
            candidates: matches.iter().map(|d| d.tag().to_string()).collect(),
        }),
    }
}

/// Every registry entry with its canonical encoding, in tag order
pub fn entries() -> Vec<(Datatype, CellFormatSpec)> {
    Datatype::prototypes()
        .map(|datatype| (datatype, encode(datatype)))
        .collect()
}
