//! Logical column datatypes
//!
//! A [`Datatype`] is one of eight fixed tags. Numeric tags carry a decimal
//! place count; the others carry nothing, so an invalid combination cannot be
//! built once construction has gone through [`Datatype::new`].

use crate::errors::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every tag accepted by [`Datatype::new`], in registry order
pub const TYPE_TAGS: [&str; 8] = [
    "string", "number", "unumber", "date", "time", "datetime", "duration", "boolean",
];

/// Logical type of a spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DatatypeRepr", into = "DatatypeRepr")]
pub enum Datatype {
    String,
    /// Number with a fixed count of decimal places
    Number { decimals: u32 },
    /// Number restricted to values >= 0 by a sheet validation rule
    UNumber { decimals: u32 },
    Date,
    Time,
    DateTime,
    /// Elapsed time, hours not wrapped at 24
    Duration,
    Boolean,
}

impl Datatype {
    /// Validated factory.
    ///
    /// Tags match exactly, lowercase and unpadded. `decimals` is only kept
    /// for `number`/`unumber` (default 0) and ignored for every other tag.
    pub fn new(tag: &str, decimals: Option<u32>) -> Result<Self> {
        let decimals = decimals.unwrap_or(0);
        match tag {
            "string" => Ok(Datatype::String),
            "number" => Ok(Datatype::Number { decimals }),
            "unumber" => Ok(Datatype::UNumber { decimals }),
            "date" => Ok(Datatype::Date),
            "time" => Ok(Datatype::Time),
            "datetime" => Ok(Datatype::DateTime),
            "duration" => Ok(Datatype::Duration),
            "boolean" => Ok(Datatype::Boolean),
            _ => Err(SchemaError::UnknownType {
                tag: tag.to_string(),
            }),
        }
    }

    pub fn number(decimals: u32) -> Self {
        Datatype::Number { decimals }
    }

    pub fn unumber(decimals: u32) -> Self {
        Datatype::UNumber { decimals }
    }

    /// The tag this datatype was built from
    pub fn tag(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Number { .. } => "number",
            Datatype::UNumber { .. } => "unumber",
            Datatype::Date => "date",
            Datatype::Time => "time",
            Datatype::DateTime => "datetime",
            Datatype::Duration => "duration",
            Datatype::Boolean => "boolean",
        }
    }

    /// Decimal places; always 0 for non-numeric types
    pub fn decimals(&self) -> u32 {
        match self {
            Datatype::Number { decimals } | Datatype::UNumber { decimals } => *decimals,
            _ => 0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Datatype::Number { .. } | Datatype::UNumber { .. })
    }

    /// Same tag with a different decimal count (no-op for non-numeric types)
    pub fn with_decimals(self, decimals: u32) -> Self {
        match self {
            Datatype::Number { .. } => Datatype::Number { decimals },
            Datatype::UNumber { .. } => Datatype::UNumber { decimals },
            other => other,
        }
    }

    /// One representative per tag, numeric ones with 0 decimals
    pub fn prototypes() -> impl Iterator<Item = Datatype> {
        TYPE_TAGS
            .iter()
            .filter_map(|tag| Datatype::new(tag, None).ok())
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_numeric() && self.decimals() > 0 {
            write!(f, "{}({})", self.tag(), self.decimals())
        } else {
            write!(f, "{}", self.tag())
        }
    }
}

/// Parses `tag` or `tag(decimals)`, the same shape `Display` writes
impl FromStr for Datatype {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((tag, rest)) = s.split_once('(') {
            let decimals = rest
                .strip_suffix(')')
                .and_then(|d| d.trim().parse::<u32>().ok())
                .ok_or_else(|| SchemaError::UnknownType { tag: s.to_string() })?;
            return Datatype::new(tag, Some(decimals));
        }
        Datatype::new(s, None)
    }
}

/// Wire/config form: either a bare tag or `{"type": ..., "decimals": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DatatypeRepr {
    Tag(String),
    Full {
        #[serde(rename = "type")]
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decimals: Option<u32>,
    },
}

impl TryFrom<DatatypeRepr> for Datatype {
    type Error = SchemaError;

    fn try_from(repr: DatatypeRepr) -> Result<Self> {
        match repr {
            DatatypeRepr::Tag(tag) => tag.parse(),
            DatatypeRepr::Full { tag, decimals } => Datatype::new(&tag, decimals),
        }
    }
}

impl From<Datatype> for DatatypeRepr {
    fn from(datatype: Datatype) -> Self {
        DatatypeRepr::Full {
            tag: datatype.tag().to_string(),
            decimals: datatype.is_numeric().then(|| datatype.decimals()),
        }
    }
}
