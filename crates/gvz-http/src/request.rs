//! Request description, turned into a `reqwest` request by [`crate::HttpClient`]

use crate::error::{HttpError, HttpResult};
use serde::Serialize;
use std::fmt;

/// The verbs the Sheets and Drive endpoints need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// An absolute URL plus query, auth and JSON body.
///
/// Query parameters stay an ordered list: `spreadsheets.get` takes the
/// `ranges` key once per range.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub method: HttpMethod,
    pub url: String,
    pub query_params: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    bearer: Option<String>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query_params: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// One `key=value` pair per value
    pub fn query_all<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_params
            .extend(values.into_iter().map(|v| (key.to_string(), v.into())));
        self
    }

    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> HttpResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| HttpError::Json(format!("Failed to serialize request body: {}", e)))?;
        Ok(self.json_value(value))
    }

    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub(crate) fn into_reqwest(self, client: &reqwest::Client) -> HttpResult<reqwest::RequestBuilder> {
        let url = url::Url::parse(&self.url)?;
        if url.cannot_be_a_base() {
            return Err(HttpError::InvalidRequest(format!("not a request URL: {}", self.url)));
        }

        let mut request = client.request(self.method.to_reqwest(), url);
        if !self.query_params.is_empty() {
            request = request.query(&self.query_params);
        }
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &self.body {
            request = request.json(body);
        }
        Ok(request)
    }
}
