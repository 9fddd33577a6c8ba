//! Database model: one spreadsheet holding ordered tables

use crate::errors::{Result, SchemaError};
use crate::table::{SheetId, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    name: String,
    /// Spreadsheet id
    id: String,
    tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Append a table and stamp it with this database's id.
    ///
    /// Names are already unique in a validated template; the check is
    /// repeated here for tables assembled by hand.
    pub fn add_table(&mut self, mut table: Table) -> Result<()> {
        if self.find_table_by_name(table.name()).is_some() {
            return Err(SchemaError::DuplicateTable {
                name: table.name().to_string(),
            });
        }
        table.set_database_id(&self.id);
        self.tables.push(table);
        Ok(())
    }

    pub fn find_table(&self, id: SheetId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id() == Some(id))
    }

    pub fn find_table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Datatype;
    use crate::table::Column;

    fn table(name: &str, id: SheetId) -> Table {
        Table::new(name, Some(id), vec![Column::new("a", Datatype::String)])
    }

    #[test]
    fn test_add_table_stamps_database_id() {
        let mut db = Database::new("Club", "sheet-123");
        db.add_table(table("Members", 1)).unwrap();
        db.add_table(table("Events", 2)).unwrap();

        assert_eq!(db.tables().len(), 2);
        assert_eq!(db.tables()[0].database_id(), Some("sheet-123"));
        assert_eq!(db.find_table(2).map(Table::name), Some("Events"));
        assert!(db.find_table(3).is_none());
        assert_eq!(db.find_table_by_name("Members").and_then(Table::id), Some(1));
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut db = Database::new("Club", "sheet-123");
        db.add_table(table("Members", 1)).unwrap();
        let err = db.add_table(table("Members", 2)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateTable {
                name: "Members".to_string()
            }
        );
        assert_eq!(db.tables().len(), 1);
    }
}
