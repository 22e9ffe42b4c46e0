//! Integration test harness for liftlog
//! Wires a real HTTP client against a mockito server

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockito::ServerGuard;
use tokio::task::JoinHandle;

use liftlog_lib::auth::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use liftlog_lib::navigation::RecordingNavigator;
use liftlog_lib::{
    ApiClient, ApiRequest, ClientConfig, ClientError, ClientResult, CredentialStore, HttpClient,
    KeyValueStore, MemoryStore, ReqwestHttpClient, Session, SessionEventBus, SessionRedirector,
    SimpleHttpResponse,
};

pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Transport whose renewal calls never reach the network
pub struct UnreachableRenewal {
    inner: ReqwestHttpClient,
}

#[async_trait]
impl HttpClient for UnreachableRenewal {
    async fn send(&self, request: &ApiRequest) -> ClientResult<SimpleHttpResponse> {
        if request.path == REFRESH_PATH {
            return Err(ClientError::Transport(
                "error sending request: connection refused".to_string(),
            ));
        }
        self.inner.send(request).await
    }
}

/// A client, its storage and the observers of its session
pub struct TestContext {
    pub server: ServerGuard,
    pub client: ApiClient,
    pub storage: Arc<dyn KeyValueStore>,
    pub events: SessionEventBus,
    pub navigator: Arc<RecordingNavigator>,
    redirector: JoinHandle<()>,
}

impl TestContext {
    /// Client against a fresh server, credentials pre-seeded in memory
    pub async fn new(entries: &[(&'static str, &'static str)]) -> Self {
        let storage: Arc<dyn KeyValueStore> =
            Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        Self::build(mockito::Server::new_async().await, storage, false).await
    }

    /// Seeded with `token=T1` and `refreshToken=R1`
    pub async fn signed_in() -> Self {
        Self::new(&[(ACCESS_TOKEN_KEY, "T1"), (REFRESH_TOKEN_KEY, "R1")]).await
    }

    /// Signed in, but the renewal endpoint is unreachable
    pub async fn signed_in_offline_renewal() -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_entries([
            (ACCESS_TOKEN_KEY, "T1"),
            (REFRESH_TOKEN_KEY, "R1"),
        ]));
        Self::build(mockito::Server::new_async().await, storage, true).await
    }

    /// Client over arbitrary storage
    pub async fn with_storage(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::build(mockito::Server::new_async().await, storage, false).await
    }

    async fn build(server: ServerGuard, storage: Arc<dyn KeyValueStore>, offline_renewal: bool) -> Self {
        let config = ClientConfig::with_base_url(server.url());
        let reqwest_client = ReqwestHttpClient::new(&config).unwrap();
        let transport: Arc<dyn HttpClient> = if offline_renewal {
            Arc::new(UnreachableRenewal {
                inner: reqwest_client,
            })
        } else {
            Arc::new(reqwest_client)
        };

        let credentials = Arc::new(CredentialStore::load(storage.clone()).await.unwrap());
        let events = SessionEventBus::new(32);
        let navigator = Arc::new(RecordingNavigator::new());
        let redirector = SessionRedirector::spawn(&events, navigator.clone(), "/login");

        let session = Session::new(credentials, transport.clone(), events.clone(), REFRESH_PATH);
        let client = ApiClient::new(transport, Arc::new(session));

        Self {
            server,
            client,
            storage,
            events,
            navigator,
            redirector,
        }
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).await.unwrap()
    }

    /// Wait until the redirector has navigated `count` times
    pub async fn wait_for_redirects(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let visited = self.navigator.visited();
            if visited.len() >= count {
                return visited;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.navigator.visited()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.redirector.abort();
    }
}

pub fn token_body(access: &str, refresh: &str) -> String {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "expires_in": 1800
    })
    .to_string()
}

pub fn user_body() -> String {
    serde_json::json!({
        "id": 1,
        "email": "lifter@example.com",
        "nickname": "Ironside",
        "body_weight": 82.5,
        "unit_preference": "kg",
        "is_active": true,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
    .to_string()
}
