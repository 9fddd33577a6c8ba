//! gvz-schema: the pure layer of gvz
//!
//! Everything here is synchronous and free of I/O:
//!
//! - [`Datatype`] and the [`registry`] mapping it to Sheets cell formats
//! - the column [`validator`] producing API wire strings
//! - [`Table`], [`Database`] and [`template`] models
//! - [`a1`] notation helpers and the minimal [`query`] filter
//!
//! # Example
//!
//! ```
//! use gvz_schema::{Column, Datatype, Table, Validator};
//!
//! let table = Table::new(
//!     "Attendance",
//!     Some(1),
//!     vec![
//!         Column::new("name", Datatype::String),
//!         Column::new("count", Datatype::unumber(0)),
//!     ],
//! );
//! let rows = table
//!     .encode_json_rows(&serde_json::json!([["a", 1], ["b", 2]]), &Validator::default())
//!     .unwrap();
//! assert_eq!(rows, vec![vec!["a", "1"], vec!["b", "2"]]);
//! ```

pub mod a1;
pub mod database;
pub mod datatype;
pub mod errors;
pub mod query;
pub mod registry;
pub mod table;
pub mod template;
pub mod validator;
pub mod value;

pub use database::Database;
pub use datatype::{Datatype, TYPE_TAGS};
pub use errors::{Result, SchemaError};
pub use query::{Filter, ResultSet};
pub use registry::CellFormatSpec;
pub use table::{Column, RowInput, SheetId, Table};
pub use template::{ColumnTemplate, DatabaseTemplate, TableTemplate};
pub use validator::{InvalidCell, NumericPolicy, Validator};
pub use value::CellValue;
