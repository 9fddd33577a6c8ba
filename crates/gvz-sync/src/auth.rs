//! Authentication seam
//!
//! Token acquisition (consent screens, refresh exchanges) happens outside gvz.
//! An [`AuthProvider`] only reports sign-in state and hands out the current
//! bearer token.

use crate::config::AuthConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Basic profile of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self) -> SyncResult<()>;

    async fn sign_out(&self) -> SyncResult<()>;

    fn is_signed_in(&self) -> bool;

    /// Receiver that observes every sign-in status change
    fn subscribe(&self) -> watch::Receiver<bool>;

    /// Profile of the signed-in user, `None` while signed out
    fn profile(&self) -> Option<UserProfile>;

    /// Current bearer token, `None` while signed out
    fn access_token(&self) -> Option<String>;
}

/// Auth provider backed by a token obtained elsewhere
pub struct TokenAuth {
    token: RwLock<Option<String>>,
    profile: UserProfile,
    status: watch::Sender<bool>,
}

impl TokenAuth {
    /// Signed-out provider holding `token` for the next sign-in
    pub fn new(token: impl Into<String>, profile: UserProfile) -> Self {
        let (status, _) = watch::channel(false);
        Self {
            token: RwLock::new(Some(token.into())),
            profile,
            status,
        }
    }

    /// Provider with no token; sign-in fails until one is set
    pub fn empty(profile: UserProfile) -> Self {
        let (status, _) = watch::channel(false);
        Self {
            token: RwLock::new(None),
            profile,
            status,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.access_token {
            Some(token) => Self::new(token.clone(), config.profile()),
            None => Self::empty(config.profile()),
        }
    }

    /// Swap in a fresh token, e.g. after an external refresh
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    fn set_status(&self, signed_in: bool) {
        self.status.send_if_modified(|current| {
            let changed = *current != signed_in;
            *current = signed_in;
            changed
        });
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn sign_in(&self) -> SyncResult<()> {
        if self.token.read().is_none() {
            return Err(SyncError::Configuration(
                "no access token configured (set GVZ_ACCESS_TOKEN or [auth].access_token)"
                    .to_string(),
            ));
        }
        self.set_status(true);
        tracing::info!(email = %self.profile.email, "Signed in");
        Ok(())
    }

    async fn sign_out(&self) -> SyncResult<()> {
        self.set_status(false);
        tracing::info!("Signed out");
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        *self.status.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }

    fn profile(&self) -> Option<UserProfile> {
        self.is_signed_in().then(|| self.profile.clone())
    }

    fn access_token(&self) -> Option<String> {
        if self.is_signed_in() {
            self.token.read().clone()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuth")
            .field("email", &self.profile.email)
            .field("signed_in", &self.is_signed_in())
            .field("token", &self.token.read().as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
