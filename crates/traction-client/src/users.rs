//! Profile endpoints.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    pub email: String,
    pub username: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Embedded user reference carried by issues, comments and activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadAvatarResponse {
    pub avatar_url: String,
}

impl ApiClient {
    /// Fetch the signed-in user's profile.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/users/me").await
    }

    /// Apply a partial update to the signed-in user's profile.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_current_user(&self, request: &UpdateUserRequest) -> Result<User, ApiError> {
        self.patch_json("/users/me", request).await
    }

    /// Upload a new avatar image.
    #[tracing::instrument(skip(self, bytes), level = "info")]
    pub async fn upload_avatar(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<UploadAvatarResponse, ApiError> {
        self.post_multipart("/users/me/avatar", "avatar", file_name, bytes)
            .await
    }
}
