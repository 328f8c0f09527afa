//! Issue endpoints: CRUD, board position, subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::users::UserSummary;

/// Issue priority, transmitted as 0-4 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(into = "u8", from = "u8")]
pub enum Priority {
    #[default]
    None,
    Urgent,
    High,
    Medium,
    Low,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::None => 0,
            Priority::Urgent => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        match value {
            1 => Priority::Urgent,
            2 => Priority::High,
            3 => Priority::Medium,
            4 => Priority::Low,
            _ => Priority::None,
        }
    }
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "No priority",
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Embedded workflow state reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[serde(rename = "type")]
    pub state_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub team_id: String,
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status_id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    // Embedded associations the server may include.
    #[serde(default)]
    pub status: Option<StatusRef>,
    #[serde(default)]
    pub assignee: Option<UserSummary>,
    #[serde(default)]
    pub created_by_user: Option<UserSummary>,
}

/// Server-side list filter; unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub status_id: Option<String>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
    pub project_id: Option<String>,
    pub created_by_id: Option<String>,
}

impl IssueFilter {
    fn append_query(&self, query: &mut String) {
        if let Some(status_id) = &self.status_id {
            query.push_str(&format!("&status_id={}", urlencoding::encode(status_id)));
        }
        if let Some(priority) = self.priority {
            query.push_str(&format!("&priority={}", u8::from(priority)));
        }
        if let Some(assignee_id) = &self.assignee_id {
            query.push_str(&format!("&assignee_id={}", urlencoding::encode(assignee_id)));
        }
        if let Some(project_id) = &self.project_id {
            query.push_str(&format!("&project_id={}", urlencoding::encode(project_id)));
        }
        if let Some(created_by_id) = &self.created_by_id {
            query.push_str(&format!(
                "&created_by_id={}",
                urlencoding::encode(created_by_id)
            ));
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueListResponse {
    pub issues: Vec<Issue>,
    pub total: i64,
    pub page: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatePositionRequest {
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueSubscriber {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberListResponse {
    pub subscribers: Vec<IssueSubscriber>,
}

impl ApiClient {
    /// List a team's issues with optional filtering, newest page first.
    #[tracing::instrument(skip(self, filter), level = "info")]
    pub async fn list_issues(
        &self,
        team_id: &str,
        filter: Option<&IssueFilter>,
        page: i64,
        page_size: i64,
    ) -> Result<IssueListResponse, ApiError> {
        let mut query = format!("page={}&page_size={}", page, page_size);
        if let Some(filter) = filter {
            filter.append_query(&mut query);
        }
        self.get_json(&format!(
            "/teams/{}/issues?{}",
            urlencoding::encode(team_id),
            query
        ))
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_issue(
        &self,
        team_id: &str,
        request: &CreateIssueRequest,
    ) -> Result<Issue, ApiError> {
        self.post_json(
            &format!("/teams/{}/issues", urlencoding::encode(team_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue, ApiError> {
        self.get_json(&format!("/issues/{}", urlencoding::encode(issue_id)))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_issue(
        &self,
        issue_id: &str,
        request: &UpdateIssueRequest,
    ) -> Result<Issue, ApiError> {
        self.put_json(&format!("/issues/{}", urlencoding::encode(issue_id)), request)
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/issues/{}", urlencoding::encode(issue_id)))
            .await
    }

    /// Restore a soft-deleted issue.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn restore_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.post_unit::<()>(
            &format!("/issues/{}/restore", urlencoding::encode(issue_id)),
            None,
        )
        .await
    }

    /// Move an issue on the board, optionally across workflow states.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_issue_position(
        &self,
        issue_id: &str,
        request: &UpdatePositionRequest,
    ) -> Result<(), ApiError> {
        self.put_unit(
            &format!("/issues/{}/position", urlencoding::encode(issue_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn subscribe_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.post_unit::<()>(
            &format!("/issues/{}/subscribe", urlencoding::encode(issue_id)),
            None,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn unsubscribe_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/issues/{}/subscribe", urlencoding::encode(issue_id)))
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_issue_subscribers(
        &self,
        issue_id: &str,
    ) -> Result<SubscriberListResponse, ApiError> {
        self.get_json(&format!(
            "/issues/{}/subscribers",
            urlencoding::encode(issue_id)
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_priority_wire_values() {
        assert_eq!(u8::from(Priority::None), 0);
        assert_eq!(u8::from(Priority::Urgent), 1);
        assert_eq!(u8::from(Priority::Low), 4);
        assert_eq!(Priority::from(2), Priority::High);
        // Out-of-range values degrade to no priority.
        assert_eq!(Priority::from(9), Priority::None);
    }

    #[test]
    fn test_update_request_serializes_only_set_fields() {
        let request = UpdateIssueRequest {
            title: Some("New title".into()),
            priority: Some(Priority::High),
            ..UpdateIssueRequest::default()
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"title":"New title","priority":2}"#);
    }

    #[test]
    fn test_filter_query_encoding() {
        let filter = IssueFilter {
            status_id: Some("state 1".into()),
            priority: Some(Priority::Urgent),
            ..IssueFilter::default()
        };
        let mut query = String::new();
        filter.append_query(&mut query);
        assert_eq!(query, "&status_id=state%201&priority=1");
    }
}
