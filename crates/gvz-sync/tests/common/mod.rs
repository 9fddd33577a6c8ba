//! In-memory spreadsheet service for gateway tests
//!
//! Applies batch updates and appends to a small model of each spreadsheet so
//! create -> reload -> append -> select round trips can be checked without a
//! network. Every call is recorded by name.

#![allow(dead_code)]

use async_trait::async_trait;
use gvz_schema::a1::quote_sheet_name;
use gvz_sync::wire::{
    AppendResponse, BatchRequest, BatchUpdateResponse, DriveFile, GridData, RowData, Sheet,
    SheetProperties, Spreadsheet, SpreadsheetProperties, SPREADSHEET_MIME_TYPE,
};
use gvz_sync::{
    AuthProvider, GatewayConfig, SpreadsheetTransport, SyncError, SyncGateway, SyncResult,
    TokenAuth, UserProfile,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct FakeSheet {
    pub id: i64,
    pub title: String,
    pub headers: Vec<Value>,
    pub formats: Vec<Value>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBook {
    pub title: String,
    pub sheets: Vec<FakeSheet>,
}

#[derive(Default)]
pub struct FakeTransport {
    pub books: Mutex<BTreeMap<String, FakeBook>>,
    pub failing: Mutex<HashSet<String>>,
    pub fail_batches: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
    pub batches: Mutex<Vec<(String, Vec<BatchRequest>)>>,
    pub appends: Mutex<Vec<(String, String, Vec<Vec<String>>)>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_book(&self, id: &str, book: FakeBook) {
        self.books.lock().insert(id.to_string(), book);
    }

    pub fn fail(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    fn check(&self, id: &str) -> SyncResult<()> {
        if self.failing.lock().contains(id) {
            return Err(SyncError::RemoteOperation(format!("{} is unavailable", id)));
        }
        Ok(())
    }

    fn book(&self, id: &str) -> SyncResult<FakeBook> {
        self.books
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::RemoteOperation(format!("no spreadsheet {}", id)))
    }
}

fn metadata(id: &str, book: &FakeBook) -> Spreadsheet {
    Spreadsheet {
        spreadsheet_id: id.to_string(),
        properties: SpreadsheetProperties {
            title: book.title.clone(),
        },
        sheets: book
            .sheets
            .iter()
            .enumerate()
            .map(|(index, s)| Sheet {
                properties: SheetProperties {
                    sheet_id: Some(s.id),
                    title: s.title.clone(),
                    index: Some(index as i64),
                },
                data: Vec::new(),
            })
            .collect(),
    }
}

fn sheet_for_range<'a>(book: &'a FakeBook, range: &str) -> Option<&'a FakeSheet> {
    book.sheets
        .iter()
        .find(|s| range.starts_with(&format!("{}!", quote_sheet_name(&s.title))))
}

#[async_trait]
impl SpreadsheetTransport for FakeTransport {
    async fn list_files(&self, query: &str) -> SyncResult<Vec<DriveFile>> {
        self.record("list_files");
        self.queries.lock().push(query.to_string());
        Ok(self
            .books
            .lock()
            .iter()
            .map(|(id, book)| DriveFile {
                id: id.clone(),
                name: book.title.clone(),
                mime_type: SPREADSHEET_MIME_TYPE.to_string(),
            })
            .collect())
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> SyncResult<Spreadsheet> {
        self.record("get_spreadsheet");
        self.check(spreadsheet_id)?;
        Ok(metadata(spreadsheet_id, &self.book(spreadsheet_id)?))
    }

    async fn get_cell_data(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        fields: &str,
    ) -> SyncResult<Spreadsheet> {
        self.record("get_cell_data");
        self.check(spreadsheet_id)?;
        let book = self.book(spreadsheet_id)?;
        let with_formats = fields.contains("userEnteredFormat");

        let sheets = ranges
            .iter()
            .filter_map(|range| sheet_for_range(&book, range))
            .map(|s| {
                let row_data = if with_formats {
                    vec![
                        RowData {
                            values: s.headers.clone(),
                        },
                        RowData {
                            values: s.formats.clone(),
                        },
                    ]
                } else {
                    s.rows
                        .iter()
                        .map(|row| RowData {
                            values: row
                                .iter()
                                .map(|v| json!({ "formattedValue": v }))
                                .collect(),
                        })
                        .collect()
                };
                Sheet {
                    properties: SheetProperties::default(),
                    data: vec![GridData { row_data }],
                }
            })
            .collect();

        Ok(Spreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheets,
            ..Default::default()
        })
    }

    async fn create_spreadsheet(&self, title: &str) -> SyncResult<Spreadsheet> {
        self.record("create_spreadsheet");
        let id = format!("created-{}", self.books.lock().len() + 1);
        self.add_book(
            &id,
            FakeBook {
                title: title.to_string(),
                sheets: vec![FakeSheet {
                    id: 0,
                    title: "Sheet1".to_string(),
                    ..Default::default()
                }],
            },
        );
        Ok(metadata(&id, &self.book(&id)?))
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> SyncResult<BatchUpdateResponse> {
        self.record("batch_update");
        self.batches
            .lock()
            .push((spreadsheet_id.to_string(), requests.clone()));
        if *self.fail_batches.lock() {
            return Err(SyncError::RemoteOperation("batchUpdate rejected".to_string()));
        }

        let mut books = self.books.lock();
        let book = books
            .get_mut(spreadsheet_id)
            .ok_or_else(|| SyncError::RemoteOperation(format!("no spreadsheet {}", spreadsheet_id)))?;

        // Applied to a copy so a rejected request leaves the book untouched
        let mut sheets = book.sheets.clone();
        for (n, request) in requests.iter().enumerate() {
            match request {
                BatchRequest::AddSheet(add) => {
                    let title = &add.properties.title;
                    if sheets.iter().any(|s| &s.title == title) {
                        return Err(SyncError::RemoteOperation(format!(
                            "request {}: a sheet with the name \"{}\" already exists",
                            n, title
                        )));
                    }
                    sheets.push(FakeSheet {
                        id: add.properties.sheet_id.unwrap_or_default(),
                        title: title.clone(),
                        ..Default::default()
                    });
                }
                BatchRequest::DeleteSheet(delete) => {
                    sheets.retain(|s| s.id != delete.sheet_id);
                    if sheets.is_empty() {
                        return Err(SyncError::RemoteOperation(format!(
                            "request {}: cannot delete the only sheet",
                            n
                        )));
                    }
                }
                BatchRequest::UpdateCells(update) => {
                    if let Some(sheet) = sheets.iter_mut().find(|s| s.id == update.start.sheet_id) {
                        sheet.headers = update.rows[0]
                            .values
                            .iter()
                            .map(|v| json!({ "formattedValue": v["userEnteredValue"]["stringValue"] }))
                            .collect();
                    }
                }
                BatchRequest::RepeatCell(repeat) => {
                    if let Some(sheet) = sheets.iter_mut().find(|s| s.id == repeat.range.sheet_id) {
                        let column = repeat.range.start_column_index.unwrap_or_default() as usize;
                        if sheet.formats.len() <= column {
                            sheet.formats.resize(column + 1, json!({}));
                        }
                        sheet.formats[column] = repeat.cell.clone();
                    }
                }
            }
        }
        book.sheets = sheets;

        Ok(BatchUpdateResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            replies: vec![json!({}); requests.len()],
        })
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> SyncResult<AppendResponse> {
        self.record("append_values");
        self.check(spreadsheet_id)?;
        self.appends
            .lock()
            .push((spreadsheet_id.to_string(), range.to_string(), rows.clone()));

        let mut books = self.books.lock();
        if let Some(book) = books.get_mut(spreadsheet_id) {
            let title = sheet_for_range(book, range).map(|s| s.title.clone());
            if let Some(sheet) = book.sheets.iter_mut().find(|s| Some(&s.title) == title.as_ref()) {
                sheet.rows.extend(rows);
            }
        }
        Ok(AppendResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            ..Default::default()
        })
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        given_name: "Ada".to_string(),
        family_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        picture_url: None,
    }
}

/// A sheet as `create_database` would have left it
pub fn typed_sheet(id: i64, title: &str, columns: &[(&str, gvz_schema::Datatype)]) -> FakeSheet {
    FakeSheet {
        id,
        title: title.to_string(),
        headers: columns
            .iter()
            .map(|(header, _)| json!({ "formattedValue": header }))
            .collect(),
        formats: columns
            .iter()
            .map(|(_, datatype)| gvz_schema::registry::encode(*datatype).cell)
            .collect(),
        rows: Vec::new(),
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub auth: Arc<TokenAuth>,
    pub gateway: SyncGateway,
}

pub async fn harness(config: GatewayConfig, signed_in: bool) -> Harness {
    harness_with_profile(config, profile(), signed_in).await
}

pub async fn harness_with_profile(
    config: GatewayConfig,
    profile: UserProfile,
    signed_in: bool,
) -> Harness {
    let transport = Arc::new(FakeTransport::new());
    let auth = Arc::new(TokenAuth::new("test-token", profile));
    if signed_in {
        auth.sign_in().await.unwrap();
    }
    let gateway = SyncGateway::new(transport.clone(), auth.clone(), &config);
    Harness {
        transport,
        auth,
        gateway,
    }
}
