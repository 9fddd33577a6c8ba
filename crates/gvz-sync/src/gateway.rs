//! Sync gateway: create, reload, append and select against a transport
//!
//! The gateway owns the [`DatabaseStore`]. Cached databases change only when
//! an operation completes successfully; reloads replace by id, never merge.

use crate::auth::{AuthProvider, UserProfile};
use crate::config::GatewayConfig;
use crate::error::{SyncError, SyncResult};
use crate::flair;
use crate::google::GoogleTransport;
use crate::store::DatabaseStore;
use crate::transport::SpreadsheetTransport;
use crate::wire::{
    AddSheetRequest, AppendResponse, BatchRequest, DeleteSheetRequest, GridCoordinate, GridRange,
    RepeatCellRequest, RowData, Sheet, SheetProperties, UpdateCellsRequest, SPREADSHEET_MIME_TYPE,
};
use futures::future::join_all;
use gvz_schema::{
    a1, registry, CellValue, Column, Database, DatabaseTemplate, Filter, ResultSet, SheetId,
    Table, Validator,
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Header row plus the first data row: headers and datatypes
const SCHEMA_FIELDS: &str = "sheets/data/rowData/values/userEnteredFormat/numberFormat,sheets/data/rowData/values/dataValidation,sheets/data/rowData/values/formattedValue";

const VALUE_FIELDS: &str = "sheets/data/rowData/values/formattedValue";

/// Outcome of [`SyncGateway::reload_all`]
#[derive(Debug, Clone)]
pub struct ReloadSummary {
    pub databases: Vec<Database>,
    /// Candidates whose reload failed
    pub skipped: usize,
    /// Candidates after flair filtering
    pub total: usize,
}

pub struct SyncGateway {
    transport: Arc<dyn SpreadsheetTransport>,
    auth: Arc<dyn AuthProvider>,
    store: Arc<DatabaseStore>,
    flair: RwLock<Option<String>>,
    validator: Validator,
}

impl SyncGateway {
    pub fn new(
        transport: Arc<dyn SpreadsheetTransport>,
        auth: Arc<dyn AuthProvider>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            transport,
            auth,
            store: Arc::new(DatabaseStore::new()),
            flair: RwLock::new(config.flair.clone().filter(|f| !f.is_empty())),
            validator: Validator::new(config.numeric_policy),
        }
    }

    /// Gateway talking to the Google APIs
    pub fn google(config: &GatewayConfig, auth: Arc<dyn AuthProvider>) -> SyncResult<Self> {
        let transport = GoogleTransport::new(config, auth.clone())?;
        Ok(Self::new(Arc::new(transport), auth, config))
    }

    fn require_sign_in(&self) -> SyncResult<()> {
        if self.auth.is_signed_in() {
            Ok(())
        } else {
            Err(SyncError::NotSignedIn)
        }
    }

    // ------------------------------------------------------------------
    // Auth passthrough
    // ------------------------------------------------------------------

    pub async fn sign_in(&self) -> SyncResult<()> {
        self.auth.sign_in().await
    }

    pub async fn sign_out(&self) -> SyncResult<()> {
        self.auth.sign_out().await
    }

    /// Sign out if signed in, otherwise sign in. Returns the new status.
    pub async fn toggle_auth(&self) -> SyncResult<bool> {
        if self.auth.is_signed_in() {
            self.auth.sign_out().await?;
            Ok(false)
        } else {
            self.auth.sign_in().await?;
            Ok(true)
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.is_signed_in()
    }

    pub fn user_info(&self) -> Option<UserProfile> {
        self.auth.profile()
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<bool> {
        self.auth.subscribe()
    }

    // ------------------------------------------------------------------
    // Flair
    // ------------------------------------------------------------------

    pub fn set_flair(&self, flair: impl Into<String>) {
        let flair = flair.into();
        *self.flair.write() = Some(flair).filter(|f| !f.is_empty());
    }

    pub fn flair(&self) -> Option<String> {
        self.flair.read().clone()
    }

    pub fn clear_flair(&self) {
        *self.flair.write() = None;
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    pub fn databases(&self) -> Vec<Database> {
        self.store.all()
    }

    pub fn database(&self, id: &str) -> SyncResult<Database> {
        self.store
            .get(id)
            .ok_or_else(|| SyncError::DatabaseNotFound(id.to_string()))
    }

    pub fn is_database(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    pub fn store(&self) -> Arc<DatabaseStore> {
        self.store.clone()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    fn table(&self, database_id: &str, table_id: SheetId) -> SyncResult<Table> {
        self.database(database_id)?
            .find_table(table_id)
            .cloned()
            .ok_or_else(|| SyncError::TableNotFound {
                database_id: database_id.to_string(),
                table_id,
            })
    }

    // ------------------------------------------------------------------
    // Remote operations
    // ------------------------------------------------------------------

    /// Create a spreadsheet from `template` and return its reloaded model.
    ///
    /// Creation, setup and reload are separate remote calls. If anything
    /// fails after the spreadsheet exists, the error is `PartialCreate` and
    /// carries the spreadsheet id; nothing is rolled back.
    pub async fn create_database(&self, template: &DatabaseTemplate) -> SyncResult<Database> {
        template.validate()?;
        self.require_sign_in()?;

        let title = flair::apply(self.flair().as_deref(), &template.name);
        info!(title = %title, tables = template.tables.len(), "Creating database");

        let created = self.transport.create_spreadsheet(&title).await?;
        let spreadsheet_id = created.spreadsheet_id.clone();
        if spreadsheet_id.is_empty() {
            return Err(SyncError::MalformedResponse(
                "create returned no spreadsheetId".to_string(),
            ));
        }

        let requests = create_requests(template, &created.sheets);
        let outcome = match self.transport.batch_update(&spreadsheet_id, requests).await {
            Ok(_) => self.reload_database(&spreadsheet_id).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(database) => {
                info!(database_id = %spreadsheet_id, "Database created");
                Ok(database)
            }
            Err(source) => {
                warn!(
                    database_id = %spreadsheet_id,
                    error = %source.sanitized_message(),
                    "Spreadsheet created but setup did not finish"
                );
                Err(SyncError::PartialCreate {
                    spreadsheet_id,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Fetch one database and replace its cached copy
    pub async fn reload_database(&self, id: &str) -> SyncResult<Database> {
        self.require_sign_in()?;
        debug!(database_id = %id, "Reloading database");

        let database = self.fetch_database(id).await?;
        self.store.upsert(database.clone());
        info!(database_id = %id, name = %database.name(), "Reloaded database");
        Ok(database)
    }

    /// Reload every spreadsheet the user can write that matches the flair.
    ///
    /// Individual failures are skipped and counted. The cache is replaced by
    /// the successful reloads once all of them have finished. The Drive query
    /// filters on the signed-in email, so an empty one is a configuration error.
    pub async fn reload_all(&self) -> SyncResult<ReloadSummary> {
        self.require_sign_in()?;
        let email = self.auth.profile().map(|p| p.email).unwrap_or_default();
        if email.trim().is_empty() {
            return Err(SyncError::Configuration(
                "no email configured (set GVZ_EMAIL or [auth].email)".to_string(),
            ));
        }
        let files = self.transport.list_files(&drive_query(&email)).await?;

        let flair = self.flair();
        let candidates: Vec<_> = files
            .into_iter()
            .filter(|file| {
                let keep = flair::matches(flair.as_deref(), &file.name);
                if !keep {
                    debug!(name = %file.name, "Filtered out by flair");
                }
                keep
            })
            .collect();
        let total = candidates.len();

        let outcomes = join_all(candidates.iter().map(|file| self.fetch_database(&file.id))).await;

        let mut databases = Vec::with_capacity(total);
        let mut skipped = 0;
        for (file, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Ok(database) => databases.push(database),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        database_id = %file.id,
                        error = %e.sanitized_message(),
                        "Skipping database that failed to reload"
                    );
                }
            }
        }

        self.store.replace_all(databases.clone());
        info!(loaded = databases.len(), skipped, total, "Finished reloading all databases");

        Ok(ReloadSummary {
            databases,
            skipped,
            total,
        })
    }

    async fn fetch_database(&self, id: &str) -> SyncResult<Database> {
        let metadata = self.transport.get_spreadsheet(id).await?;
        let ranges: Vec<String> = metadata
            .sheets
            .iter()
            .map(|sheet| a1::rows_range(&sheet.properties.title, 1, 2))
            .collect();

        let cell_data = if ranges.is_empty() {
            Vec::new()
        } else {
            self.transport
                .get_cell_data(id, &ranges, SCHEMA_FIELDS)
                .await?
                .sheets
        };
        if cell_data.len() != metadata.sheets.len() {
            return Err(SyncError::MalformedResponse(format!(
                "spreadsheet {} has {} sheets but {} came back with cell data",
                id,
                metadata.sheets.len(),
                cell_data.len()
            )));
        }

        let mut database = Database::new(metadata.properties.title.clone(), id);
        for (sheet, data) in metadata.sheets.iter().zip(&cell_data) {
            let sheet_id = sheet.properties.sheet_id.ok_or_else(|| {
                SyncError::MalformedResponse(format!(
                    "sheet {:?} has no sheetId",
                    sheet.properties.title
                ))
            })?;
            let columns = read_columns(data)?;
            database.add_table(Table::new(
                sheet.properties.title.clone(),
                Some(sheet_id),
                columns,
            ))?;
        }
        Ok(database)
    }

    /// Validate and append one row
    pub async fn push_row(
        &self,
        database_id: &str,
        table_id: SheetId,
        row: &[CellValue],
    ) -> SyncResult<AppendResponse> {
        self.require_sign_in()?;
        let table = self.table(database_id, table_id)?;
        let encoded = vec![table.encode_row(row, &self.validator)?];
        self.append(database_id, &table, encoded).await
    }

    /// Validate every row, then append them in one call
    pub async fn push_rows(
        &self,
        database_id: &str,
        table_id: SheetId,
        rows: &[Vec<CellValue>],
    ) -> SyncResult<AppendResponse> {
        self.require_sign_in()?;
        let table = self.table(database_id, table_id)?;
        let encoded = table.encode_rows(rows, &self.validator)?;
        self.append(database_id, &table, encoded).await
    }

    /// Append a JSON row or array of rows
    pub async fn push_json(
        &self,
        database_id: &str,
        table_id: SheetId,
        input: &Value,
    ) -> SyncResult<AppendResponse> {
        self.require_sign_in()?;
        let table = self.table(database_id, table_id)?;
        let encoded = table.encode_json_rows(input, &self.validator)?;
        self.append(database_id, &table, encoded).await
    }

    async fn append(
        &self,
        database_id: &str,
        table: &Table,
        rows: Vec<Vec<String>>,
    ) -> SyncResult<AppendResponse> {
        if rows.is_empty() {
            return Ok(AppendResponse {
                spreadsheet_id: database_id.to_string(),
                ..Default::default()
            });
        }
        let count = rows.len();
        let response = self
            .transport
            .append_values(database_id, &table.append_range(), rows)
            .await?;
        info!(database_id = %database_id, table = %table.name(), rows = count, "Appended rows");
        Ok(response)
    }

    /// Formatted data rows of a table, filtered by `filter`
    pub async fn select(
        &self,
        database_id: &str,
        table_id: SheetId,
        filter: &str,
    ) -> SyncResult<ResultSet> {
        self.require_sign_in()?;
        let filter = Filter::parse(filter)?;
        let table = self.table(database_id, table_id)?;

        let data = self
            .transport
            .get_cell_data(database_id, &[table.data_range()], VALUE_FIELDS)
            .await?;
        let rows: Vec<Vec<String>> = data
            .sheets
            .first()
            .map(|sheet| {
                sheet
                    .rows()
                    .iter()
                    .map(|row| row.values.iter().map(formatted_value).collect())
                    .collect()
            })
            .unwrap_or_default();

        Ok(filter.apply(&table, rows)?)
    }
}

impl std::fmt::Debug for SyncGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncGateway")
            .field("databases", &self.store.len())
            .field("flair", &self.flair())
            .field("policy", &self.validator.policy())
            .finish()
    }
}

/// Drive query for spreadsheets `email` can write
pub fn drive_query(email: &str) -> String {
    format!(
        "mimeType='{}' and '{}' in writers and trashed = false",
        SPREADSHEET_MIME_TYPE,
        email.replace('\\', "\\\\").replace('\'', "\\'")
    )
}

fn formatted_value(cell: &Value) -> String {
    cell.get("formattedValue")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Columns from the header row (row 1) and datatype row (row 2) of a sheet
fn read_columns(sheet: &Sheet) -> SyncResult<Vec<Column>> {
    let headers = sheet.row(0).map(|r| r.values.as_slice()).unwrap_or_default();
    let formats = sheet.row(1).map(|r| r.values.as_slice()).unwrap_or_default();

    headers
        .iter()
        .enumerate()
        .map(|(index, cell)| -> SyncResult<Column> {
            let datatype = match formats.get(index) {
                Some(format) => registry::decode(format)?,
                None => None,
            };
            Ok(Column::with_datatype(formatted_value(cell), datatype))
        })
        .collect()
}

/// Title prefix of the sheet that keeps a spreadsheet non-empty while its
/// original sheets are replaced
const PLACEHOLDER_TITLE: &str = "gvz-setup";

/// The single batch that turns a fresh spreadsheet into the template's layout.
///
/// Sheet titles must stay unique and a spreadsheet can never be left without
/// a sheet at any step of the batch. A placeholder is added first, the
/// existing sheets are deleted, the tables are added, and the placeholder
/// goes last. New sheets get explicit ids above any existing one so the
/// header and format requests in the same batch can address them.
pub fn create_requests(template: &DatabaseTemplate, existing: &[Sheet]) -> Vec<BatchRequest> {
    let existing_ids: Vec<SheetId> = existing
        .iter()
        .filter_map(|sheet| sheet.properties.sheet_id)
        .collect();
    let placeholder_id = existing_ids.iter().max().map_or(0, |max| max + 1);
    let first_id = placeholder_id + 1;

    let taken: Vec<&str> = existing
        .iter()
        .map(|sheet| sheet.properties.title.as_str())
        .chain(template.tables.iter().map(|table| table.name.as_str()))
        .collect();
    let placeholder_title = placeholder_title(&taken);

    let mut requests = vec![BatchRequest::AddSheet(AddSheetRequest {
        properties: SheetProperties {
            sheet_id: Some(placeholder_id),
            title: placeholder_title,
            index: None,
        },
    })];
    for sheet_id in existing_ids {
        requests.push(BatchRequest::DeleteSheet(DeleteSheetRequest { sheet_id }));
    }
    for (index, table) in template.tables.iter().enumerate() {
        requests.push(BatchRequest::AddSheet(AddSheetRequest {
            properties: SheetProperties {
                sheet_id: Some(first_id + index as SheetId),
                title: table.name.clone(),
                index: Some(index as i64),
            },
        }));
    }

    for (index, table) in template.tables.iter().enumerate() {
        let sheet_id = first_id + index as SheetId;
        requests.push(BatchRequest::UpdateCells(UpdateCellsRequest {
            start: GridCoordinate {
                sheet_id,
                row_index: 0,
                column_index: 0,
            },
            rows: vec![RowData {
                values: table
                    .columns
                    .iter()
                    .map(|c| json!({ "userEnteredValue": { "stringValue": c.header.as_str() } }))
                    .collect(),
            }],
            fields: "userEnteredValue".to_string(),
        }));

        for (column_index, column) in table.columns.iter().enumerate() {
            let spec = registry::encode(column.datatype);
            requests.push(BatchRequest::RepeatCell(RepeatCellRequest {
                range: GridRange {
                    sheet_id,
                    start_row_index: Some(1),
                    end_row_index: None,
                    start_column_index: Some(column_index as i64),
                    end_column_index: Some(column_index as i64 + 1),
                },
                fields: spec.fields_mask(),
                cell: spec.cell,
            }));
        }
    }

    requests.push(BatchRequest::DeleteSheet(DeleteSheetRequest {
        sheet_id: placeholder_id,
    }));
    requests
}

fn placeholder_title(taken: &[&str]) -> String {
    let mut title = PLACEHOLDER_TITLE.to_string();
    let mut suffix = 1;
    while taken.contains(&title.as_str()) {
        suffix += 1;
        title = format!("{}-{}", PLACEHOLDER_TITLE, suffix);
    }
    title
}
