use std::sync::Arc;
use tracing::info;

use crate::adapters::HttpClient;
use crate::auth::credentials::{CredentialPair, CredentialStore};
use crate::auth::renewal::RenewalCoordinator;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::events::{SessionEvent, SessionEventBus};
use crate::storage::{FileStore, KeyValueStore};
use crate::validation;

/// Session lifecycle: sign-in, sign-out and renewal over one credential store
pub struct Session {
    credentials: Arc<CredentialStore>,
    events: SessionEventBus,
    renewal: RenewalCoordinator,
}

impl Session {
    pub fn new(
        credentials: Arc<CredentialStore>,
        transport: Arc<dyn HttpClient>,
        events: SessionEventBus,
        refresh_path: impl Into<String>,
    ) -> Self {
        let renewal = RenewalCoordinator::new(
            transport,
            credentials.clone(),
            events.clone(),
            refresh_path,
        );
        Self {
            credentials,
            events,
            renewal,
        }
    }

    /// Restore the session persisted at `config.storage_path`
    pub async fn open(
        config: &ClientConfig,
        transport: Arc<dyn HttpClient>,
        events: SessionEventBus,
    ) -> ClientResult<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));
        let credentials = Arc::new(CredentialStore::load(storage).await?);
        Ok(Self::new(
            credentials,
            transport,
            events,
            config.refresh_path.clone(),
        ))
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn events(&self) -> &SessionEventBus {
        &self.events
    }

    pub(crate) fn renewal(&self) -> &RenewalCoordinator {
        &self.renewal
    }

    /// Path of the renewal endpoint this session uses
    pub fn refresh_path(&self) -> &str {
        self.renewal.refresh_path()
    }

    /// Store freshly issued credentials
    pub async fn sign_in(&self, pair: CredentialPair) -> ClientResult<()> {
        validation::required("access_token", &pair.access_token)?;
        validation::required("refresh_token", &pair.refresh_token)?;

        self.credentials.set(&pair).await?;
        self.events.publish(SessionEvent::SignedIn).await;
        info!("Signed in");
        Ok(())
    }

    /// Forget the credentials
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.credentials.clear().await?;
        self.events.publish(SessionEvent::SignedOut).await;
        info!("Signed out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated().await
    }

    /// Renew credentials ahead of expiry
    pub async fn renew(&self) -> ClientResult<CredentialPair> {
        self.renewal.renew_now().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http_client::mock::MockHttpClient;
    use crate::storage::MemoryStore;

    async fn session() -> (Session, tokio::sync::broadcast::Receiver<crate::events::SessionNotice>) {
        let storage = Arc::new(MemoryStore::new());
        let credentials = Arc::new(CredentialStore::load(storage).await.unwrap());
        let events = SessionEventBus::new(8);
        let rx = events.subscribe();
        let session = Session::new(
            credentials,
            Arc::new(MockHttpClient::new()),
            events,
            "/api/auth/refresh",
        );
        (session, rx)
    }

    #[tokio::test]
    async fn test_sign_in_and_out_emit_events() {
        let (session, mut rx) = session().await;

        session.sign_in(CredentialPair::new("T1", "R1")).await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(rx.recv().await.unwrap().event, SessionEvent::SignedIn);

        session.sign_out().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(rx.recv().await.unwrap().event, SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_incomplete_pair() {
        let (session, _rx) = session().await;
        let result = session.sign_in(CredentialPair::new("T1", "")).await;
        assert!(matches!(result, Err(crate::error::ClientError::Validation(_))));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_open_reads_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token": "T1", "refreshToken": "R1"}"#).unwrap();

        let config = ClientConfig {
            storage_path: path,
            ..ClientConfig::with_base_url("http://localhost:8000")
        };
        let session = Session::open(&config, Arc::new(MockHttpClient::new()), SessionEventBus::default())
            .await
            .unwrap();
        assert_eq!(
            session.credentials().get().await,
            Some(CredentialPair::new("T1", "R1"))
        );
    }
}
