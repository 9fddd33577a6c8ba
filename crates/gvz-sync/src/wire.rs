//! Sheets v4 / Drive v3 request and response bodies
//!
//! Only the fields gvz reads or writes are modelled. Cell data stays as raw
//! JSON since the registry compares it structurally.

use gvz_schema::SheetId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Drive file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

/// One page of a Drive `files.list` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<SheetId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    #[serde(default)]
    pub properties: SheetProperties,
    #[serde(default)]
    pub data: Vec<GridData>,
}

impl Sheet {
    /// Row `index` of the first grid, if the service returned it
    pub fn row(&self, index: usize) -> Option<&RowData> {
        self.data.first().and_then(|grid| grid.row_data.get(index))
    }

    pub fn rows(&self) -> &[RowData] {
        self.data
            .first()
            .map(|grid| grid.row_data.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: SheetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: SheetId,
    pub row_index: i64,
    pub column_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheetRequest {
    pub sheet_id: SheetId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatCellRequest {
    pub range: GridRange,
    pub cell: Value,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsRequest {
    pub start: GridCoordinate,
    pub rows: Vec<RowData>,
    pub fields: String,
}

/// One entry of a `batchUpdate` request list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchRequest {
    AddSheet(AddSheetRequest),
    DeleteSheet(DeleteSheetRequest),
    RepeatCell(RepeatCellRequest),
    UpdateCells(UpdateCellsRequest),
}

impl BatchRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            BatchRequest::AddSheet(_) => "addSheet",
            BatchRequest::DeleteSheet(_) => "deleteSheet",
            BatchRequest::RepeatCell(_) => "repeatCell",
            BatchRequest::UpdateCells(_) => "updateCells",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub replies: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<i64>,
    #[serde(default)]
    pub updated_cells: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}
