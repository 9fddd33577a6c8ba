//! Table model and row encoding
//!
//! A table is one sheet. Its columns are fixed by position; every encoded row
//! must have exactly one value per column.

use crate::a1;
use crate::datatype::Datatype;
use crate::errors::{Result, SchemaError};
use crate::validator::Validator;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sheet id assigned by the spreadsheet service
pub type SheetId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    header: String,
    /// `None` when the sheet's format matched no known datatype
    datatype: Option<Datatype>,
}

impl Column {
    pub fn new(header: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            header: header.into(),
            datatype: Some(datatype),
        }
    }

    /// Column whose datatype could not be determined
    pub fn unrecognized(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            datatype: None,
        }
    }

    pub fn with_datatype(header: impl Into<String>, datatype: Option<Datatype>) -> Self {
        Self {
            header: header.into(),
            datatype,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn datatype(&self) -> Option<&Datatype> {
        self.datatype.as_ref()
    }
}

/// Row input for [`Table::encode`]
#[derive(Debug, Clone, PartialEq)]
pub enum RowInput {
    Single(Vec<CellValue>),
    Many(Vec<Vec<CellValue>>),
}

impl RowInput {
    /// Detect the shape of a JSON array.
    ///
    /// All elements arrays -> many rows; no element an array -> one row;
    /// anything else is rejected before a single value is converted.
    pub fn from_json(input: &Value) -> Result<Self> {
        let items = input.as_array().ok_or_else(|| {
            SchemaError::RowShape(format!("expected an array of values or rows, got {}", input))
        })?;

        let nested = items.iter().filter(|item| item.is_array()).count();
        if nested == 0 {
            let row = items
                .iter()
                .map(CellValue::from_json)
                .collect::<Result<Vec<_>>>()?;
            return Ok(RowInput::Single(row));
        }
        if nested != items.len() {
            return Err(SchemaError::RowShape(
                "mixed rows and scalar values".to_string(),
            ));
        }

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let cells = item.as_array().map(Vec::as_slice).unwrap_or_default();
            if cells.iter().any(Value::is_array) {
                return Err(SchemaError::RowShape(
                    "rows nested more than one level".to_string(),
                ));
            }
            rows.push(
                cells
                    .iter()
                    .map(CellValue::from_json)
                    .collect::<Result<Vec<_>>>()?,
            );
        }
        Ok(RowInput::Many(rows))
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        match self {
            RowInput::Single(row) => vec![row],
            RowInput::Many(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    id: Option<SheetId>,
    columns: Vec<Column>,
    /// Spreadsheet id of the owning database
    database_id: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, id: Option<SheetId>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            id,
            columns,
            database_id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<SheetId> {
        self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub(crate) fn set_database_id(&mut self, database_id: &str) {
        self.database_id = Some(database_id.to_string());
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.header == header)
    }

    /// Range the append call targets: the header row span
    pub fn append_range(&self) -> String {
        a1::row_span(&self.name, 1, self.column_count())
    }

    /// Every data row below the header
    pub fn data_range(&self) -> String {
        a1::open_range(&self.name, 2, self.column_count())
    }

    /// Validate and encode one row (reported as row 0)
    pub fn encode_row(&self, row: &[CellValue], validator: &Validator) -> Result<Vec<String>> {
        self.encode_at(0, row, validator)
    }

    /// Validate and encode every row; the first failure aborts the call
    pub fn encode_rows(
        &self,
        rows: &[Vec<CellValue>],
        validator: &Validator,
    ) -> Result<Vec<Vec<String>>> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.encode_at(index, row, validator))
            .collect()
    }

    pub fn encode(&self, input: &RowInput, validator: &Validator) -> Result<Vec<Vec<String>>> {
        match input {
            RowInput::Single(row) => Ok(vec![self.encode_row(row, validator)?]),
            RowInput::Many(rows) => self.encode_rows(rows, validator),
        }
    }

    /// Shape-sniffing entry point for JSON input
    pub fn encode_json_rows(&self, input: &Value, validator: &Validator) -> Result<Vec<Vec<String>>> {
        self.encode(&RowInput::from_json(input)?, validator)
    }

    fn encode_at(&self, index: usize, row: &[CellValue], validator: &Validator) -> Result<Vec<String>> {
        if row.len() != self.columns.len() {
            return Err(SchemaError::RowArity {
                row: index,
                expected: self.columns.len(),
                actual: row.len(),
            });
        }

        self.columns
            .iter()
            .zip(row)
            .enumerate()
            .map(|(position, (column, value))| {
                let rejected = |reason: String| SchemaError::RowValidation {
                    row: index,
                    column: position,
                    header: column.header.clone(),
                    value: value.to_string(),
                    reason,
                };
                let datatype = column
                    .datatype
                    .as_ref()
                    .ok_or_else(|| rejected("column datatype could not be determined".to_string()))?;
                validator
                    .validate(datatype, value)
                    .map_err(|invalid| rejected(invalid.reason))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attendance() -> Table {
        Table::new(
            "Attendance",
            Some(1),
            vec![
                Column::new("name", Datatype::String),
                Column::new("count", Datatype::unumber(0)),
            ],
        )
    }

    #[test]
    fn test_ranges() {
        let table = attendance();
        assert_eq!(table.append_range(), "'Attendance'!A1:B1");
        assert_eq!(table.data_range(), "'Attendance'!A2:B");
    }

    #[test]
    fn test_arity_checked_first() {
        let err = attendance()
            .encode_row(&["a".into()], &Validator::default())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowArity {
                row: 0,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_first_invalid_cell_reported() {
        let rows = vec![
            vec!["a".into(), 1.into()],
            vec!["b".into(), "x".into()],
        ];
        match attendance().encode_rows(&rows, &Validator::default()) {
            Err(SchemaError::RowValidation {
                row, column, value, ..
            }) => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(value, "x");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_column_rejects_rows() {
        let table = Table::new("T", Some(1), vec![Column::unrecognized("price")]);
        assert!(matches!(
            table.encode_row(&["1".into()], &Validator::default()),
            Err(SchemaError::RowValidation { .. })
        ));
    }

    #[test]
    fn test_row_input_shapes() {
        assert!(matches!(
            RowInput::from_json(&json!([["a", 1], ["b", 2]])).unwrap(),
            RowInput::Many(rows) if rows.len() == 2
        ));
        assert!(matches!(
            RowInput::from_json(&json!(["a", 1])).unwrap(),
            RowInput::Single(row) if row.len() == 2
        ));
        assert!(matches!(
            RowInput::from_json(&json!([["a", 1], "b"])),
            Err(SchemaError::RowShape(_))
        ));
        assert!(matches!(
            RowInput::from_json(&json!([["a", ["b"]]])),
            Err(SchemaError::RowShape(_))
        ));
        assert!(matches!(
            RowInput::from_json(&json!({"a": 1})),
            Err(SchemaError::RowShape(_))
        ));
    }
}
