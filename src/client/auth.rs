use crate::adapters::ApiRequest;
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{
    ChangePassword, LoginCredentials, RefreshRequest, RegisterData, TokenResponse, User,
    UserUpdate,
};
use crate::validation;

impl ApiClient {
    /// Exchange email and password for a token pair.
    ///
    /// Does not store the tokens; see [`crate::stores::UserStore::login`].
    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<TokenResponse> {
        validation::email(&credentials.email)?;
        validation::required("password", &credentials.password)?;

        let request = ApiRequest::post("/api/auth/login").with_json(credentials)?;
        self.execute_public(request).await
    }

    pub async fn register(&self, data: &RegisterData) -> ClientResult<TokenResponse> {
        validation::email(&data.email)?;
        validation::password(&data.password)?;

        let request = ApiRequest::post("/api/auth/register").with_json(data)?;
        self.execute_public(request).await
    }

    /// Call the renewal endpoint directly, without touching stored credentials
    pub async fn refresh_token(&self, refresh_token: &str) -> ClientResult<TokenResponse> {
        let request = ApiRequest::post(self.session().refresh_path()).with_json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?;
        self.execute_public(request).await
    }

    pub async fn get_profile(&self) -> ClientResult<User> {
        self.get("/api/auth/me").await
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> ClientResult<User> {
        if let Some(body_weight) = update.body_weight {
            validation::positive("body_weight", body_weight)?;
        }
        if let Some(height) = update.height {
            validation::positive("height", height)?;
        }
        self.put("/api/auth/me", update).await
    }

    pub async fn change_password(&self, data: &ChangePassword) -> ClientResult<()> {
        validation::required("old_password", &data.old_password)?;
        validation::password(&data.new_password)?;
        self.post("/api/auth/change-password", data).await
    }

    /// Tell the server the session is over. Local credentials are untouched.
    pub async fn logout(&self) -> ClientResult<()> {
        self.execute(ApiRequest::post("/api/auth/logout")).await
    }
}
