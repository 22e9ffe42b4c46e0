use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::adapters::{ApiRequest, HttpClient};
use crate::auth::credentials::{CredentialPair, CredentialStore};
use crate::error::{ClientError, ClientResult};
use crate::events::{SessionEvent, SessionEventBus, TerminationReason};
use crate::models::{RefreshRequest, TokenResponse};

/// Serializes credential renewal.
///
/// Requests that fail with 401 queue on a single gate. The first one through
/// performs the renewal; the rest notice the credential revision moved while
/// they waited and reuse that outcome instead of renewing again.
pub struct RenewalCoordinator {
    /// Bare transport, bypassing authorization and renewal
    transport: Arc<dyn HttpClient>,
    credentials: Arc<CredentialStore>,
    events: SessionEventBus,
    /// Path of the renewal endpoint
    refresh_path: String,
    /// Held for the whole renewal
    gate: Mutex<()>,
}

impl RenewalCoordinator {
    pub fn new(
        transport: Arc<dyn HttpClient>,
        credentials: Arc<CredentialStore>,
        events: SessionEventBus,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            events,
            refresh_path: refresh_path.into(),
            gate: Mutex::new(()),
        }
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// Recover from a 401 on a request sent at `seen_revision`.
    ///
    /// Returns once fresh credentials are stored, so the caller can resubmit.
    /// Otherwise returns the error the caller should surface: the original
    /// `unauthorized` error when there was nothing to renew with, or
    /// `SessionExpired` when renewal failed and the session was terminated.
    pub async fn recover(&self, seen_revision: u64, unauthorized: ClientError) -> ClientResult<()> {
        let _gate = self.gate.lock().await;
        let snapshot = self.credentials.snapshot().await;

        if snapshot.revision != seen_revision {
            return match snapshot.access_token {
                Some(_) => {
                    debug!(
                        seen_revision,
                        revision = snapshot.revision,
                        "Credentials changed while waiting, reusing them"
                    );
                    Ok(())
                }
                None => {
                    debug!(
                        seen_revision,
                        revision = snapshot.revision,
                        "Session ended while waiting for renewal"
                    );
                    Err(ClientError::SessionExpired {
                        reason: "session ended while the request was in flight".to_string(),
                    })
                }
            };
        }

        let Some(refresh_token) = snapshot.refresh_token.clone() else {
            if snapshot.is_empty() {
                // Anonymous request, there is no session to end
                return Err(unauthorized);
            }

            warn!("Access token rejected and no refresh token stored, ending session");
            self.terminate(TerminationReason::MissingRefreshToken).await?;
            return Err(unauthorized);
        };

        self.renew_with(&refresh_token).await.map(|_| ())
    }

    /// Renew now, regardless of whether the current access token still works
    pub async fn renew_now(&self) -> ClientResult<CredentialPair> {
        let _gate = self.gate.lock().await;

        match self.credentials.refresh_token().await {
            Some(refresh_token) => self.renew_with(&refresh_token).await,
            None => {
                if self.credentials.is_authenticated().await {
                    self.terminate(TerminationReason::MissingRefreshToken).await?;
                }
                Err(ClientError::SessionExpired {
                    reason: TerminationReason::MissingRefreshToken.to_string(),
                })
            }
        }
    }

    /// Exchange the refresh token for a new pair. Must hold the gate.
    async fn renew_with(&self, refresh_token: &str) -> ClientResult<CredentialPair> {
        info!("Renewing session credentials");

        match self.request_renewal(refresh_token).await {
            Ok(pair) => {
                self.credentials.set(&pair).await?;
                self.events.publish(SessionEvent::Renewed).await;
                info!("Session credentials renewed");
                Ok(pair)
            }
            Err(reason) => {
                error!(%reason, "Credential renewal failed, ending session");
                self.terminate(reason.clone()).await?;
                Err(ClientError::SessionExpired {
                    reason: reason.to_string(),
                })
            }
        }
    }

    async fn request_renewal(&self, refresh_token: &str) -> Result<CredentialPair, TerminationReason> {
        let request = ApiRequest::post(self.refresh_path.as_str())
            .with_json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .map_err(|e| TerminationReason::RenewalFailed {
                message: e.to_string(),
            })?;

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| TerminationReason::RenewalFailed {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            let status = response.status();
            let message = match ClientError::from_status(status, response.text()) {
                ClientError::Http { message, .. } => message,
                other => other.to_string(),
            };
            return Err(TerminationReason::RenewalRejected { status, message });
        }

        let tokens: TokenResponse =
            response
                .json()
                .map_err(|e| TerminationReason::RenewalFailed {
                    message: format!("invalid renewal response: {e}"),
                })?;
        let pair = CredentialPair::from(tokens);

        if !pair.is_complete() {
            return Err(TerminationReason::RenewalFailed {
                message: "renewal response is missing a token".to_string(),
            });
        }

        Ok(pair)
    }

    /// Clear both tokens and announce the end of the session
    async fn terminate(&self, reason: TerminationReason) -> ClientResult<()> {
        self.credentials.clear().await?;
        self.events
            .publish(SessionEvent::Terminated { reason })
            .await;
        Ok(())
    }
}
