use gvz_http::HttpError;
use gvz_schema::SchemaError;
use thiserror::Error;

/// Sync gateway errors
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Request failed. The user is not signed in.")]
    NotSignedIn,

    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown database id {0:?}")]
    DatabaseNotFound(String),

    #[error("Database {database_id:?} has no table with id {table_id}")]
    TableNotFound { database_id: String, table_id: i64 },

    /// The spreadsheet exists remotely but setup did not finish
    #[error("Spreadsheet {spreadsheet_id} was created but left partially configured: {source}")]
    PartialCreate {
        spreadsheet_id: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Check if the error came from the remote side
    pub fn is_remote(&self) -> bool {
        match self {
            SyncError::RemoteOperation(_)
            | SyncError::Http(_)
            | SyncError::MalformedResponse(_) => true,
            SyncError::PartialCreate { source, .. } => source.is_remote(),
            _ => false,
        }
    }

    /// Message safe to print: tokens in HTTP errors are redacted
    pub fn sanitized_message(&self) -> String {
        match self {
            SyncError::Http(e) => format!("HTTP error: {}", e.sanitized_message()),
            SyncError::PartialCreate {
                spreadsheet_id,
                source,
            } => format!(
                "Spreadsheet {} was created but left partially configured: {}",
                spreadsheet_id,
                source.sanitized_message()
            ),
            other => other.to_string(),
        }
    }
}
