//! Read-only selection over formatted table rows
//!
//! The filter grammar is deliberately small: an empty expression selects
//! every row, `<header> = <value>` selects rows whose formatted cell equals
//! `value`. The value may be wrapped in single or double quotes.

use crate::errors::{Result, SchemaError};
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Equals { header: String, value: String },
}

impl Filter {
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(Filter::All);
        }

        let (header, value) = expression.split_once('=').ok_or_else(|| {
            SchemaError::InvalidFilter(format!(
                "expected `<header> = <value>`, got {:?}",
                expression
            ))
        })?;
        let header = header.trim();
        if header.is_empty() {
            return Err(SchemaError::InvalidFilter("missing column header".to_string()));
        }

        Ok(Filter::Equals {
            header: header.to_string(),
            value: unquote(value.trim()).to_string(),
        })
    }

    /// Select matching rows of `table`.
    ///
    /// Rows come back from the service with trailing empty cells dropped, so
    /// short rows are padded to the column count first.
    pub fn apply(&self, table: &Table, rows: Vec<Vec<String>>) -> Result<ResultSet> {
        let width = table.column_count();
        let target = match self {
            Filter::All => None,
            Filter::Equals { header, value } => {
                let index = table.column_index(header).ok_or_else(|| {
                    SchemaError::InvalidFilter(format!(
                        "table {:?} has no column {:?}",
                        table.name(),
                        header
                    ))
                })?;
                Some((index, value.as_str()))
            }
        };

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .filter(|row| match target {
                Some((index, value)) => row[index] == value,
                None => true,
            })
            .collect();

        Ok(ResultSet {
            columns: table.columns().to_vec(),
            rows,
        })
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<Column>,
    /// Formatted cell values, one entry per column
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
