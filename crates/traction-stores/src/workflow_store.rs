//! Workflow state (board column) cache per team.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::workflows::{CreateStateRequest, UpdateStateRequest, WorkflowState};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct WorkflowStoreState {
    by_team: HashMap<String, Vec<WorkflowState>>,
    is_loading: bool,
    error: Option<String>,
}

pub struct WorkflowStore {
    client: Arc<ApiClient>,
    state: RwLock<WorkflowStoreState>,
}

impl WorkflowStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(WorkflowStoreState::default()),
        }
    }

    /// Cached states for a team, in board position order.
    pub fn states_for(&self, team_id: &str) -> Vec<WorkflowState> {
        self.state
            .read()
            .by_team
            .get(team_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub async fn fetch_states(&self, team_id: &str) -> Result<(), ApiError> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        match self.client.list_workflow_states(team_id).await {
            Ok(mut states) => {
                states.sort_by_key(|s| s.position);
                let mut state = self.state.write();
                state.by_team.insert(team_id.to_string(), states);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.write();
                state.is_loading = false;
                state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn create_state(
        &self,
        team_id: &str,
        request: &CreateStateRequest,
    ) -> Result<(), ApiError> {
        self.client.create_workflow_state(team_id, request).await?;
        self.fetch_states(team_id).await
    }

    pub async fn update_state(
        &self,
        team_id: &str,
        state_id: &str,
        request: &UpdateStateRequest,
    ) -> Result<(), ApiError> {
        self.client.update_workflow_state(state_id, request).await?;
        self.fetch_states(team_id).await
    }

    pub async fn delete_state(&self, team_id: &str, state_id: &str) -> Result<(), ApiError> {
        self.client.delete_workflow_state(state_id).await?;
        self.state
            .write()
            .by_team
            .entry(team_id.to_string())
            .or_default()
            .retain(|s| s.id != state_id);
        Ok(())
    }
}
