//! Google Sheets v4 / Drive v3 transport over gvz-http

use crate::auth::AuthProvider;
use crate::config::GatewayConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SpreadsheetTransport;
use crate::wire::{
    AppendResponse, BatchRequest, BatchUpdateResponse, DriveFile, FileList, Spreadsheet,
};
use async_trait::async_trait;
use gvz_http::{HttpClient, HttpMethod, RequestBuilder};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const DRIVE_PAGE_SIZE: &str = "1000";

pub struct GoogleTransport {
    client: HttpClient,
    auth: Arc<dyn AuthProvider>,
    sheets_base_url: Url,
    drive_base_url: Url,
}

impl GoogleTransport {
    pub fn new(config: &GatewayConfig, auth: Arc<dyn AuthProvider>) -> SyncResult<Self> {
        let client = HttpClient::new(config.http_config())?;
        Ok(Self {
            client,
            auth,
            sheets_base_url: parse_base(&config.sheets_base_url)?,
            drive_base_url: parse_base(&config.drive_base_url)?,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as a path segment
    fn endpoint(base: &Url, segments: &[&str]) -> SyncResult<String> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Configuration(format!("{} cannot be a base URL", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    fn sheets_url(&self, segments: &[&str]) -> SyncResult<String> {
        Self::endpoint(&self.sheets_base_url, segments)
    }

    fn authorized(&self, method: HttpMethod, url: String) -> SyncResult<RequestBuilder> {
        let token = self.auth.access_token().ok_or(SyncError::NotSignedIn)?;
        Ok(self.client.request(method, &url).bearer_auth(token))
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> SyncResult<T> {
        Ok(self.client.send_json(request).await?)
    }
}

fn parse_base(raw: &str) -> SyncResult<Url> {
    Url::parse(raw).map_err(|e| SyncError::Configuration(format!("invalid base URL {:?}: {}", raw, e)))
}

#[async_trait]
impl SpreadsheetTransport for GoogleTransport {
    async fn list_files(&self, query: &str) -> SyncResult<Vec<DriveFile>> {
        let url = Self::endpoint(&self.drive_base_url, &["files"])?;
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .authorized(HttpMethod::Get, url.clone())?
                .query("q", query)
                .query("pageSize", DRIVE_PAGE_SIZE)
                .query("fields", "nextPageToken,files(id,name,mimeType)");
            if let Some(token) = &page_token {
                request = request.query("pageToken", token.as_str());
            }

            let page: FileList = self.send(request).await?;
            debug!(count = page.files.len(), "Drive page received");
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(files)
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> SyncResult<Spreadsheet> {
        let request = self.authorized(HttpMethod::Get, self.sheets_url(&["spreadsheets", spreadsheet_id])?)?;
        self.send(request).await
    }

    async fn get_cell_data(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        fields: &str,
    ) -> SyncResult<Spreadsheet> {
        let request = self
            .authorized(HttpMethod::Get, self.sheets_url(&["spreadsheets", spreadsheet_id])?)?
            .query_all("ranges", ranges.iter().map(String::as_str))
            .query("fields", fields);
        self.send(request).await
    }

    async fn create_spreadsheet(&self, title: &str) -> SyncResult<Spreadsheet> {
        let request = self
            .authorized(HttpMethod::Post, self.sheets_url(&["spreadsheets"])?)?
            .json_value(serde_json::json!({ "properties": { "title": title } }));
        self.send(request).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> SyncResult<BatchUpdateResponse> {
        let action = format!("{}:batchUpdate", spreadsheet_id);
        let request = self
            .authorized(HttpMethod::Post, self.sheets_url(&["spreadsheets", &action])?)?
            .json(&serde_json::json!({ "requests": requests }))?;
        self.send(request).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> SyncResult<AppendResponse> {
        let action = format!("{}:append", range);
        let request = self
            .authorized(
                HttpMethod::Post,
                self.sheets_url(&["spreadsheets", spreadsheet_id, "values", &action])?,
            )?
            .query("valueInputOption", "USER_ENTERED")
            .query("insertDataOption", "INSERT_ROWS")
            .json_value(serde_json::json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }));
        self.send(request).await
    }
}

impl std::fmt::Debug for GoogleTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTransport")
            .field("sheets_base_url", &self.sheets_base_url.as_str())
            .field("drive_base_url", &self.drive_base_url.as_str())
            .finish()
    }
}
