//! Schema error types
//!
//! Every failure of the pure layer (datatype factory, registry, validator,
//! templates, row encoding) is reported through [`SchemaError`].

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Error types for schema operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Type tag outside the fixed set
    #[error(
        "Unknown type \"{tag}\", expected {{string|number|unumber|date|time|datetime|duration|boolean}}"
    )]
    UnknownType { tag: String },

    /// Template failed structural validation
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Row length differs from the table's column count
    #[error("Row {row} has {actual} values, table expects {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A single cell failed its column's type check
    #[error("Row {row}, column {column} (\"{header}\"): value {value:?} rejected: {reason}")]
    RowValidation {
        row: usize,
        column: usize,
        header: String,
        value: String,
        reason: String,
    },

    /// Row input was neither a single row nor a list of rows
    #[error("Invalid row shape: {0}")]
    RowShape(String),

    /// A raw value could not be converted into a cell value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Two tables with the same name in one database
    #[error("Table {name:?} already exists in this database")]
    DuplicateTable { name: String },

    /// More than one registry entry matched an observed cell format.
    /// The fixed registry never produces this; seeing it means the registry
    /// itself is broken.
    #[error("Registry conflict: cell format matches {candidates:?}")]
    RegistryConflict { candidates: Vec<String> },

    /// Select filter could not be parsed or names an unknown column
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl SchemaError {
    /// Returns true if the error concerns row input rather than schema
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            SchemaError::RowArity { .. }
                | SchemaError::RowValidation { .. }
                | SchemaError::RowShape(_)
                | SchemaError::InvalidValue(_)
        )
    }
}
