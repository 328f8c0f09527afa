//! Credential issuance and revocation.
//!
//! Login/register persist the returned token pair; logout revokes the
//! refresh token best-effort and always clears stored credentials.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::users::User;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub workspace_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl ApiClient {
    /// Sign in with email and password. On success the returned token pair
    /// is stored and subsequent requests carry it.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self.post_json("/auth/login", request).await?;
        self.save_tokens(&traction_auth::TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        });
        tracing::info!(user = %response.user.id, "signed in");
        Ok(response.user)
    }

    /// Create an account and sign in.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self.post_json("/auth/register", request).await?;
        self.save_tokens(&traction_auth::TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        });
        Ok(response.user)
    }

    /// Revoke the stored refresh token and clear credentials. Revocation
    /// failures are ignored; the local session is gone either way.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn logout(&self) {
        if let Some(pair) = self.stored_tokens() {
            let body = serde_json::json!({ "refresh_token": pair.refresh_token });
            if let Err(err) = self.post_unit("/auth/logout", Some(&body)).await {
                tracing::debug!("logout revocation failed: {}", err);
            }
        }
        self.clear_tokens();
    }
}
