//! Label endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLabelRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ApiClient {
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_labels(&self, team_id: &str) -> Result<Vec<Label>, ApiError> {
        self.get_json(&format!("/teams/{}/labels", urlencoding::encode(team_id)))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_label(
        &self,
        team_id: &str,
        request: &CreateLabelRequest,
    ) -> Result<Label, ApiError> {
        self.post_json(
            &format!("/teams/{}/labels", urlencoding::encode(team_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_label(
        &self,
        label_id: &str,
        request: &UpdateLabelRequest,
    ) -> Result<Label, ApiError> {
        self.put_json(&format!("/labels/{}", urlencoding::encode(label_id)), request)
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_label(&self, label_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/labels/{}", urlencoding::encode(label_id)))
            .await
    }
}
