use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::auth::CredentialPair;
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::stores::error_message;
use crate::models::{LoginCredentials, RegisterData, TokenResponse, User, UserUpdate};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const FETCH_PROFILE_FAILED: &str = "Failed to load profile";
const UPDATE_PROFILE_FAILED: &str = "Failed to update profile";
const FALLBACK_DISPLAY_NAME: &str = "User";

/// Observable state of the signed-in user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub user: Option<User>,
    /// An operation is in flight
    pub loading: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
}

/// Current user plus the operations that change it
pub struct UserStore {
    client: ApiClient,
    state: RwLock<UserState>,
}

impl UserStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(UserState::default()),
        }
    }

    pub async fn state(&self) -> UserState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated().await
    }

    /// Nickname, then email, then a generic label
    pub async fn display_name(&self) -> String {
        let state = self.state.read().await;
        state
            .user
            .as_ref()
            .and_then(|u| {
                u.nickname
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .or(Some(u.email.as_str()).filter(|e| !e.is_empty()))
            })
            .unwrap_or(FALLBACK_DISPLAY_NAME)
            .to_string()
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<TokenResponse> {
        self.begin().await;
        let result = self.sign_in_with(self.client.login(credentials).await).await;
        self.finish(result, LOGIN_FAILED).await
    }

    pub async fn register(&self, data: &RegisterData) -> ClientResult<TokenResponse> {
        self.begin().await;
        let result = self.sign_in_with(self.client.register(data).await).await;
        self.finish(result, REGISTER_FAILED).await
    }

    pub async fn fetch_profile(&self) -> ClientResult<User> {
        self.begin().await;
        let result = self.load_profile().await;
        self.finish(result, FETCH_PROFILE_FAILED).await
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> ClientResult<User> {
        self.begin().await;
        let result = match self.client.update_profile(update).await {
            Ok(user) => {
                self.state.write().await.user = Some(user.clone());
                Ok(user)
            }
            Err(e) => Err(e),
        };
        self.finish(result, UPDATE_PROFILE_FAILED).await
    }

    /// Forget the user and the stored credentials
    pub async fn logout(&self) -> ClientResult<()> {
        self.state.write().await.user = None;
        self.client.session().sign_out().await
    }

    async fn sign_in_with(
        &self,
        issued: ClientResult<TokenResponse>,
    ) -> ClientResult<TokenResponse> {
        let tokens = issued?;
        self.client
            .session()
            .sign_in(CredentialPair::from(tokens.clone()))
            .await?;
        self.load_profile().await?;
        Ok(tokens)
    }

    async fn load_profile(&self) -> ClientResult<User> {
        let user = self.client.get_profile().await?;
        debug!(user_id = user.id, "Loaded user profile");
        self.state.write().await.user = Some(user.clone());
        Ok(user)
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn finish<T>(&self, result: ClientResult<T>, fallback: &str) -> ClientResult<T> {
        let mut state = self.state.write().await;
        state.loading = false;
        if let Err(e) = &result {
            error!(error = %e, "{}", fallback);
            state.error = Some(error_message(e, fallback));
        }
        result
    }
}
