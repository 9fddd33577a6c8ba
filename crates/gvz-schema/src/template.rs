//! Templates for databases that do not exist yet
//!
//! A [`DatabaseTemplate`] is authored by the caller (in code or as a JSON/TOML
//! file), validated, then handed to the gateway for creation.
//!
//! ```toml
//! name = "Club"
//!
//! [[tables]]
//! name = "Members"
//! columns = [
//!     { header = "name", datatype = "string" },
//!     { header = "dues", datatype = { type = "unumber", decimals = 2 } },
//! ]
//! ```

use crate::datatype::Datatype;
use crate::errors::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTemplate {
    pub header: String,
    #[serde(alias = "type")]
    pub datatype: Datatype,
}

impl ColumnTemplate {
    pub fn new(header: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            header: header.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableTemplate {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnTemplate>,
}

impl TableTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder-style column append
    pub fn column(mut self, header: impl Into<String>, datatype: Datatype) -> Self {
        self.push_column(ColumnTemplate::new(header, datatype));
        self
    }

    pub fn push_column(&mut self, column: ColumnTemplate) {
        self.columns.push(column);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTemplate {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableTemplate>,
}

impl DatabaseTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Builder-style table append
    pub fn table(mut self, table: TableTemplate) -> Self {
        self.push_table(table);
        self
    }

    pub fn push_table(&mut self, table: TableTemplate) {
        self.tables.push(table);
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// First structural violation, if any
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("database name is empty"));
        }
        if self.tables.is_empty() {
            return Err(invalid("database has no tables"));
        }

        let mut names = HashSet::new();
        for (index, table) in self.tables.iter().enumerate() {
            if table.name.trim().is_empty() {
                return Err(invalid(format!("table {} has an empty name", index)));
            }
            if !names.insert(table.name.as_str()) {
                return Err(invalid(format!("duplicate table name {:?}", table.name)));
            }
            if table.columns.is_empty() {
                return Err(invalid(format!("table {:?} has no columns", table.name)));
            }
            if let Some(position) = table.columns.iter().position(|c| c.header.trim().is_empty()) {
                return Err(invalid(format!(
                    "table {:?} column {} has an empty header",
                    table.name, position
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SchemaError {
    SchemaError::InvalidTemplate(message.into())
}
