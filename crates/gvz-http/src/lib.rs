//! gvz-http: async REST client for the Google APIs used by GVZ
//!
//! A thin layer over `reqwest` that knows how Google REST endpoints
//! authenticate, take repeated query parameters and report errors.
//!
//! - `HttpClient`: pooled client, `execute` and `send_json`
//! - `RequestBuilder`: absolute URL, ordered query, bearer token, JSON body
//! - `HttpResponse`: buffered body and Google error envelope decoding
//!
//! Spreadsheet semantics live in `gvz-sync`; this crate only moves JSON.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use client::HttpClient;
pub use config::HttpClientConfig;
pub use error::{HttpError, HttpResult};
pub use request::{HttpMethod, RequestBuilder};
pub use response::HttpResponse;
