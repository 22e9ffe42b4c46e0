use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ClientResult;
use crate::storage::KeyValueStore;

/// Storage key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "token";
/// Storage key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Access/refresh token pair issued by the server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived bearer token attached to every authorized request
    pub access_token: String,
    /// Longer-lived token used only to mint a new pair
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Both tokens are non-empty
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

// Token values never end up in logs
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Point-in-time view of the stored credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Incremented on every set or clear
    pub revision: u64,
}

impl fmt::Debug for CredentialSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSnapshot")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("revision", &self.revision)
            .finish()
    }
}

impl CredentialSnapshot {
    /// True when neither token is present
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Single owner of the session credentials.
///
/// Memory and durable storage are kept in lockstep: a mutation holds the
/// write lock across the storage write and only updates the cache once the
/// write succeeded, so readers never observe a state storage does not hold.
pub struct CredentialStore {
    /// Durable backing store
    storage: Arc<dyn KeyValueStore>,
    /// In-memory credential cache
    state: RwLock<CredentialSnapshot>,
}

impl CredentialStore {
    /// Restore credentials from storage
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let access_token = non_empty(storage.get(ACCESS_TOKEN_KEY).await?);
        let refresh_token = non_empty(storage.get(REFRESH_TOKEN_KEY).await?);

        info!(
            has_access_token = access_token.is_some(),
            has_refresh_token = refresh_token.is_some(),
            "Loaded stored credentials"
        );

        Ok(Self {
            storage,
            state: RwLock::new(CredentialSnapshot {
                access_token,
                refresh_token,
                revision: 0,
            }),
        })
    }

    /// Current credentials with their revision
    pub async fn snapshot(&self) -> CredentialSnapshot {
        self.state.read().await.clone()
    }

    /// The full pair, if both tokens are present
    pub async fn get(&self) -> Option<CredentialPair> {
        let state = self.state.read().await;
        match (&state.access_token, &state.refresh_token) {
            (Some(access), Some(refresh)) => Some(CredentialPair::new(access, refresh)),
            _ => None,
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    /// Revision of the current credentials
    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// True when an access token is present
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    /// Replace both tokens with a single storage write
    pub async fn set(&self, pair: &CredentialPair) -> ClientResult<()> {
        let mut state = self.state.write().await;

        self.storage
            .set_entries(&[
                (ACCESS_TOKEN_KEY, pair.access_token.as_str()),
                (REFRESH_TOKEN_KEY, pair.refresh_token.as_str()),
            ])
            .await?;

        state.access_token = non_empty(Some(pair.access_token.clone()));
        state.refresh_token = non_empty(Some(pair.refresh_token.clone()));
        state.revision += 1;

        debug!(revision = state.revision, "Stored new credentials");
        Ok(())
    }

    /// Remove both tokens with a single storage write
    pub async fn clear(&self) -> ClientResult<()> {
        let mut state = self.state.write().await;

        self.storage
            .remove_entries(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
            .await?;

        state.access_token = None;
        state.refresh_token = None;
        state.revision += 1;

        debug!(revision = state.revision, "Cleared credentials");
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
