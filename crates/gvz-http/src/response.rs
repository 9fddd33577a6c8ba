//! Buffered responses and Google error envelopes

use crate::error::{HttpError, HttpResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A fully read response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
    /// Time from send to last body byte
    pub latency_ms: u64,
}

/// `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`
#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl HttpResponse {
    pub(crate) async fn read(response: reqwest::Response, started: std::time::Instant) -> HttpResult<Self> {
        let status_code = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status_code,
            body,
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }

    /// Deserialize the body; an empty body reads as `{}`
    pub fn json<T: DeserializeOwned>(&self) -> HttpResult<T> {
        let body: &[u8] = if self.body.is_empty() { b"{}" } else { &self.body };
        serde_json::from_slice(body).map_err(|e| {
            HttpError::Json(format!("Unexpected response body ({} bytes): {}", self.body.len(), e))
        })
    }

    /// `HttpError::Status` for anything outside 2xx.
    ///
    /// Message and status name come from the Google error envelope when the
    /// body carries one, otherwise from the raw body text.
    pub fn error_for_status(self) -> HttpResult<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let (status, message) = match serde_json::from_slice::<GoogleErrorEnvelope>(&self.body) {
            Ok(GoogleErrorEnvelope { error }) if !error.status.is_empty() => {
                (error.status, error.message)
            }
            Ok(GoogleErrorEnvelope { error }) => ("UNKNOWN".to_string(), error.message),
            Err(_) => (
                "UNKNOWN".to_string(),
                String::from_utf8_lossy(&self.body).trim().to_string(),
            ),
        };

        Err(HttpError::Status {
            code: self.status_code,
            status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status_code: u16, body: &[u8]) -> HttpResponse {
        HttpResponse {
            status_code,
            body: body.to_vec(),
            latency_ms: 0,
        }
    }

    #[test]
    fn test_google_envelope() {
        let err = response(
            403,
            br#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#,
        )
        .error_for_status()
        .unwrap_err();

        match err {
            HttpError::Status {
                code,
                status,
                message,
            } => {
                assert_eq!(code, 403);
                assert_eq!(status, "PERMISSION_DENIED");
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_plain_error_body() {
        match response(502, b"Bad Gateway\n").error_for_status() {
            Err(HttpError::Status {
                status, message, ..
            }) => {
                assert_eq!(status, "UNKNOWN");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_success_passes_through() {
        let ok = response(200, br#"{"spreadsheetId": "abc"}"#)
            .error_for_status()
            .unwrap();
        let body: serde_json::Value = ok.json().unwrap();
        assert_eq!(body["spreadsheetId"], "abc");
    }

    #[test]
    fn test_empty_body_reads_as_object() {
        let body: serde_json::Value = response(200, b"").json().unwrap();
        assert!(body.as_object().unwrap().is_empty());
        assert!(matches!(
            response(200, b"not json").json::<serde_json::Value>(),
            Err(HttpError::Json(_))
        ));
    }
}
