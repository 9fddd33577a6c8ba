//! gvz.toml handling
//!
//! ```toml
//! [gateway]
//! flair = "club"
//! numeric_policy = "corrected"
//!
//! [auth]
//! email = "ada@example.com"
//! ```
//!
//! Environment variables (`GVZ_ACCESS_TOKEN`, `GVZ_EMAIL`, `GVZ_FLAIR`) win
//! over the file.

use anyhow::{Context, Result};
use gvz_schema::DatabaseTemplate;
use gvz_sync::{AuthConfig, GatewayConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse gvz config")
    }

    /// Read `path` if it exists, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::parse(&content)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        Ok(config.with_env())
    }

    pub fn with_env(self) -> Self {
        Self {
            gateway: self.gateway.with_env(),
            auth: self.auth.with_env(),
        }
    }
}

/// Load a database template; `.toml` files are read as TOML, anything else as JSON
pub fn load_template(path: &Path) -> Result<DatabaseTemplate> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let template: DatabaseTemplate = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).context("Invalid TOML template")?,
        _ => serde_json::from_str(&content).context("Invalid JSON template")?,
    };
    template.validate()?;
    Ok(template)
}
