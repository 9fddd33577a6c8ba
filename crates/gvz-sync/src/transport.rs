use crate::error::SyncResult;
use crate::wire::{AppendResponse, BatchRequest, BatchUpdateResponse, DriveFile, Spreadsheet};
use async_trait::async_trait;

/// The remote spreadsheet service as gvz consumes it
///
/// Implementations authenticate on their own; callers check sign-in first.
#[async_trait]
pub trait SpreadsheetTransport: Send + Sync {
    /// Every Drive file matching `query`, across all result pages
    async fn list_files(&self, query: &str) -> SyncResult<Vec<DriveFile>>;

    /// Spreadsheet metadata without grid data
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> SyncResult<Spreadsheet>;

    /// Grid data for `ranges`, restricted to the `fields` mask
    async fn get_cell_data(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        fields: &str,
    ) -> SyncResult<Spreadsheet>;

    async fn create_spreadsheet(&self, title: &str) -> SyncResult<Spreadsheet>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> SyncResult<BatchUpdateResponse>;

    /// Append rows below the table found at `range`, as if typed by a user
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> SyncResult<AppendResponse>;
}
