//! # gvz-sync
//!
//! Google Sheets as an ad-hoc database: discovers spreadsheets as databases,
//! reads their tables and column datatypes, creates new ones from templates
//! and appends validated rows.
//!
//! ## Layers
//!
//! - [`SyncGateway`]: the operations, plus the database cache it owns
//! - [`SpreadsheetTransport`]: the six remote calls the gateway needs, with
//!   [`GoogleTransport`] as the REST implementation
//! - [`AuthProvider`]: sign-in state and bearer tokens, with [`TokenAuth`]
//!   for tokens obtained elsewhere
//!
//! ## Example
//!
//! ```rust,ignore
//! use gvz_sync::{GatewayConfig, SyncGateway, TokenAuth, UserProfile};
//! use std::sync::Arc;
//!
//! let auth = Arc::new(TokenAuth::new(token, UserProfile::default()));
//! let gateway = SyncGateway::google(&GatewayConfig::default(), auth)?;
//! gateway.sign_in().await?;
//! let summary = gateway.reload_all().await?;
//! println!("{} databases, {} skipped", summary.databases.len(), summary.skipped);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod flair;
pub mod gateway;
pub mod google;
pub mod store;
pub mod transport;
pub mod wire;

pub use auth::{AuthProvider, TokenAuth, UserProfile};
pub use config::{AuthConfig, GatewayConfig};
pub use error::{SyncError, SyncResult};
pub use gateway::{ReloadSummary, SyncGateway};
pub use google::GoogleTransport;
pub use store::DatabaseStore;
pub use transport::SpreadsheetTransport;
