//! Workflow state endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

/// Category a workflow state belongs to; drives progress computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Backlog,
    Unstarted,
    Started,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub team_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub state_type: StateType,
    pub color: String,
    pub position: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub state_type: StateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub state_type: Option<StateType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiClient {
    /// List a team's workflow states in position order.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_workflow_states(
        &self,
        team_id: &str,
    ) -> Result<Vec<WorkflowState>, ApiError> {
        self.get_json(&format!(
            "/teams/{}/workflow-states",
            urlencoding::encode(team_id)
        ))
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_workflow_state(
        &self,
        team_id: &str,
        request: &CreateStateRequest,
    ) -> Result<WorkflowState, ApiError> {
        self.post_json(
            &format!("/teams/{}/workflow-states", urlencoding::encode(team_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_workflow_state(
        &self,
        state_id: &str,
        request: &UpdateStateRequest,
    ) -> Result<WorkflowState, ApiError> {
        self.put_json(
            &format!("/workflow-states/{}", urlencoding::encode(state_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_workflow_state(&self, state_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!(
            "/workflow-states/{}",
            urlencoding::encode(state_id)
        ))
        .await
    }
}
