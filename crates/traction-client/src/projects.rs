//! Project endpoints: CRUD, progress rollups, project issue listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::issues::Priority;
use crate::users::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub lead: Option<UserSummary>,
}

/// Progress rollup computed server-side from workflow state categories.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectProgress {
    pub project_id: String,
    pub total_issues: i64,
    pub completed_issues: i64,
    pub cancelled_issues: i64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub total: i64,
    pub page: i64,
}

/// Slim issue rows returned by the project issue listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectIssue {
    pub id: String,
    pub team_id: String,
    pub number: i64,
    pub title: String,
    pub status_id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectIssueListResponse {
    pub items: Vec<ProjectIssue>,
    pub total: i64,
    pub page: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl ApiClient {
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_project(
        &self,
        workspace_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<Project, ApiError> {
        self.post_json(
            &format!("/workspaces/{}/projects", urlencoding::encode(workspace_id)),
            request,
        )
        .await
    }

    /// List a team's projects, optionally filtered by status.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_team_projects(
        &self,
        team_id: &str,
        status: Option<ProjectStatus>,
        page: i64,
        page_size: i64,
    ) -> Result<ProjectListResponse, ApiError> {
        let mut path = format!(
            "/teams/{}/projects?page={}&page_size={}",
            urlencoding::encode(team_id),
            page,
            page_size
        );
        if let Some(status) = status {
            // snake_case wire form matches the serde rename.
            if let Ok(serde_json::Value::String(s)) = serde_json::to_value(status) {
                path.push_str(&format!("&status={}", s));
            }
        }
        self.get_json(&path).await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_project(&self, project_id: &str) -> Result<Project, ApiError> {
        self.get_json(&format!("/projects/{}", urlencoding::encode(project_id)))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_project(
        &self,
        project_id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        self.put_json(
            &format!("/projects/{}", urlencoding::encode(project_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/projects/{}", urlencoding::encode(project_id)))
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_project_progress(
        &self,
        project_id: &str,
    ) -> Result<ProjectProgress, ApiError> {
        self.get_json(&format!(
            "/projects/{}/progress",
            urlencoding::encode(project_id)
        ))
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_project_issues(
        &self,
        project_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<ProjectIssueListResponse, ApiError> {
        self.get_json(&format!(
            "/projects/{}/issues?page={}&page_size={}",
            urlencoding::encode(project_id),
            page,
            page_size
        ))
        .await
    }
}
