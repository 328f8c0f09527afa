//! Current workspace record and its counters.

use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::workspaces::{UpdateWorkspaceRequest, Workspace, WorkspaceStats};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct WorkspaceState {
    workspace: Option<Workspace>,
    stats: Option<WorkspaceStats>,
    is_loading: bool,
    error: Option<String>,
}

pub struct WorkspaceStore {
    client: Arc<ApiClient>,
    state: RwLock<WorkspaceState>,
}

impl WorkspaceStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(WorkspaceState::default()),
        }
    }

    pub fn workspace(&self) -> Option<Workspace> {
        self.state.read().workspace.clone()
    }

    pub fn stats(&self) -> Option<WorkspaceStats> {
        self.state.read().stats.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub async fn fetch_workspace(&self, workspace_id: &str) -> Result<(), ApiError> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        match self.client.get_workspace(workspace_id).await {
            Ok(workspace) => {
                let mut state = self.state.write();
                state.workspace = Some(workspace);
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

    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        request: &UpdateWorkspaceRequest,
    ) -> Result<(), ApiError> {
        let workspace = self.client.update_workspace(workspace_id, request).await?;
        self.state.write().workspace = Some(workspace);
        Ok(())
    }

    pub async fn fetch_stats(&self, workspace_id: &str) -> Result<(), ApiError> {
        let stats = self.client.get_workspace_stats(workspace_id).await?;
        self.state.write().stats = Some(stats);
        Ok(())
    }
}
