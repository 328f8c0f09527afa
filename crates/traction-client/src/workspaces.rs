//! Workspace endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// URL-safe slug, unique across the server.
    pub slug: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workspace-wide counters for the settings overview.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceStats {
    pub teams_count: i64,
    pub members_count: i64,
    pub issues_count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateWorkspaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl ApiClient {
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, ApiError> {
        self.get_json(&format!(
            "/workspaces/{}",
            urlencoding::encode(workspace_id)
        ))
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        request: &UpdateWorkspaceRequest,
    ) -> Result<Workspace, ApiError> {
        self.put_json(
            &format!("/workspaces/{}", urlencoding::encode(workspace_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_workspace_stats(
        &self,
        workspace_id: &str,
    ) -> Result<WorkspaceStats, ApiError> {
        self.get_json(&format!(
            "/workspaces/{}/stats",
            urlencoding::encode(workspace_id)
        ))
        .await
    }
}
