//! Gateway and auth configuration
//!
//! Both structs deserialize with defaults for every field, so a config file
//! only needs the keys it changes. Environment overrides are applied on top.

use crate::auth::UserProfile;
use gvz_http::HttpClientConfig;
use gvz_schema::NumericPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Name tag scoping which spreadsheets count as databases
    pub flair: Option<String>,
    pub numeric_policy: NumericPolicy,
    pub sheets_base_url: String,
    pub drive_base_url: String,
    pub timeout_secs: f64,
    pub user_agent: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            flair: None,
            numeric_policy: NumericPolicy::default(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            timeout_secs: 30.0,
            user_agent: None,
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by `GVZ_FLAIR`
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn with_env(mut self) -> Self {
        if let Ok(flair) = std::env::var("GVZ_FLAIR") {
            self.flair = Some(flair).filter(|f| !f.is_empty());
        }
        self
    }

    /// HTTP client settings for the Google transport
    pub fn http_config(&self) -> HttpClientConfig {
        let config = HttpClientConfig::new().timeout_secs(self.timeout_secs);
        match &self.user_agent {
            Some(user_agent) => config.user_agent(user_agent.clone()),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub picture_url: Option<String>,
}

impl AuthConfig {
    /// Defaults overridden by `GVZ_ACCESS_TOKEN` and `GVZ_EMAIL`
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("GVZ_ACCESS_TOKEN") {
            self.access_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Ok(email) = std::env::var("GVZ_EMAIL") {
            self.email = email;
        }
        self
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            email: self.email.clone(),
            picture_url: self.picture_url.clone(),
        }
    }
}
