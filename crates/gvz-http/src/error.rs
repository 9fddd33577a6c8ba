//! Errors raised while talking to Google endpoints

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    /// DNS, TCP or TLS failure before a response arrived
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx response
    #[error("Remote error {code} ({status}): {message}")]
    Status {
        code: u16,
        status: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type HttpResult<T> = Result<T, HttpError>;

static BEARER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bbearer\s+[^\s&]+").unwrap());
static TOKEN_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(access_token|token)\s*[:=]\s*[^\s&]+").unwrap());
static API_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bkey=[^&\s]+").unwrap());
static OAUTH_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bya29\.[A-Za-z0-9_.\-]+").unwrap());

impl HttpError {
    /// Split transport failures into connection and timeout errors
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::Connection(err.to_string())
        } else {
            HttpError::Reqwest(err)
        }
    }

    /// Status code when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Status { code, .. } => Some(*code),
            HttpError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 401 and 403: the token is missing, expired or lacks a scope
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    /// Display text with bearer tokens and API keys redacted
    pub fn sanitized_message(&self) -> String {
        sanitize(&self.to_string())
    }
}

pub(crate) fn sanitize(message: &str) -> String {
    let redacted = OAUTH_TOKEN.replace_all(message, "[REDACTED]");
    let redacted = BEARER.replace_all(&redacted, "Bearer [REDACTED]");
    let redacted = TOKEN_PARAM.replace_all(&redacted, "$1=[REDACTED]");
    API_KEY.replace_all(&redacted, "key=[REDACTED]").into_owned()
}
