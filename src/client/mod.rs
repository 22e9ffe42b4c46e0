//! Authorized REST client.
//!
//! Every call goes through [`ApiClient::execute`], which attaches the bearer
//! credential, normalizes the response and runs the renewal protocol on a
//! 401. Endpoint groups live in the submodules as `impl ApiClient` blocks.

pub mod analysis;
pub mod auth;
pub mod exercises;
pub mod normalizer;
pub mod workouts;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::{ApiRequest, HttpClient, ReqwestHttpClient, SimpleHttpResponse};
use crate::auth::{authorize, Session};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::events::SessionEventBus;

/// A request on its way through the renewal protocol
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: ApiRequest,
    /// Set once the request has been resubmitted after a renewal
    pub retried: bool,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }
}

/// Client for the liftlog REST API
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpClient>,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpClient>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// Build a client over HTTP with the session persisted per `config`
    pub async fn connect(config: &ClientConfig, events: SessionEventBus) -> ClientResult<Self> {
        config.validate()?;

        let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(config)?);
        let session = Session::open(config, transport.clone(), events).await?;
        Ok(Self::new(transport, Arc::new(session)))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send an authorized request and decode the payload
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.dispatch(PendingRequest::new(request)).await?;
        normalizer::decode(response)
    }

    /// Send a request with no credential and no renewal
    pub async fn execute_public<T: DeserializeOwned>(&self, mut request: ApiRequest) -> ClientResult<T> {
        authorize(&mut request, None);
        let response = self.transport.send(&request).await?;
        normalizer::normalize(response)
    }

    async fn dispatch(&self, mut pending: PendingRequest) -> ClientResult<SimpleHttpResponse> {
        let credentials = self.session.credentials();

        loop {
            let snapshot = credentials.snapshot().await;
            authorize(&mut pending.request, snapshot.access_token.as_deref());

            let response = self.transport.send(&pending.request).await?;
            if response.is_success() {
                return Ok(response);
            }

            let error = normalizer::into_error(response);
            if !error.is_unauthorized() {
                return Err(error);
            }

            if pending.retried {
                warn!(
                    method = %pending.request.method,
                    path = %pending.request.path,
                    "Request rejected again after renewal"
                );
                return Err(error);
            }

            debug!(
                method = %pending.request.method,
                path = %pending.request.path,
                revision = snapshot.revision,
                "Access token rejected, attempting renewal"
            );
            self.session
                .renewal()
                .recover(snapshot.revision, error)
                .await?;

            pending.retried = true;
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute(ApiRequest::get(path)).await
    }

    /// GET with query parameters; unset `Option` fields are left out
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::get(path).with_query(query)?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).with_json(body)?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::put(path).with_json(body)?).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::patch(path).with_json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute(ApiRequest::delete(path)).await
    }
}
