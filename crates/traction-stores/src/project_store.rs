//! Project state: records, progress rollups, per-project issue pages.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::projects::{
    CreateProjectRequest, Project, ProjectIssue, ProjectProgress, ProjectStatus,
    UpdateProjectRequest,
};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct ProjectState {
    projects: HashMap<String, Project>,
    by_team: HashMap<String, Vec<String>>,
    progress: HashMap<String, ProjectProgress>,
    issues: HashMap<String, Vec<ProjectIssue>>,
    is_loading: bool,
    error: Option<String>,
}

pub struct ProjectStore {
    client: Arc<ApiClient>,
    state: RwLock<ProjectState>,
}

impl ProjectStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(ProjectState::default()),
        }
    }

    pub fn project(&self, project_id: &str) -> Option<Project> {
        self.state.read().projects.get(project_id).cloned()
    }

    pub fn team_projects(&self, team_id: &str) -> Vec<Project> {
        let state = self.state.read();
        state
            .by_team
            .get(team_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.projects.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn progress_for(&self, project_id: &str) -> Option<ProjectProgress> {
        self.state.read().progress.get(project_id).cloned()
    }

    pub fn issues_for(&self, project_id: &str) -> Vec<ProjectIssue> {
        self.state
            .read()
            .issues
            .get(project_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
    }

    fn fail(&self, err: &ApiError) {
        let mut state = self.state.write();
        state.is_loading = false;
        state.error = Some(err.user_message());
    }

    pub async fn fetch_team_projects(
        &self,
        team_id: &str,
        status: Option<ProjectStatus>,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.list_team_projects(team_id, status, 1, 100).await {
            Ok(response) => {
                let mut state = self.state.write();
                let ids = response.items.iter().map(|p| p.id.clone()).collect();
                for project in response.items {
                    state.projects.insert(project.id.clone(), project);
                }
                state.by_team.insert(team_id.to_string(), ids);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn create_project(
        &self,
        workspace_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<Project, ApiError> {
        self.begin();
        match self.client.create_project(workspace_id, request).await {
            Ok(project) => {
                let mut state = self.state.write();
                state.projects.insert(project.id.clone(), project.clone());
                state.is_loading = false;
                Ok(project)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn fetch_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.get_project(project_id).await {
            Ok(project) => {
                let mut state = self.state.write();
                state.projects.insert(project.id.clone(), project);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_project(project_id, request).await {
            Ok(project) => {
                let mut state = self.state.write();
                state.projects.insert(project.id.clone(), project);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.delete_project(project_id).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.projects.remove(project_id);
                for ids in state.by_team.values_mut() {
                    ids.retain(|id| id != project_id);
                }
                state.progress.remove(project_id);
                state.issues.remove(project_id);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn fetch_progress(&self, project_id: &str) -> Result<(), ApiError> {
        let progress = self.client.get_project_progress(project_id).await?;
        self.state
            .write()
            .progress
            .insert(project_id.to_string(), progress);
        Ok(())
    }

    pub async fn fetch_project_issues(&self, project_id: &str) -> Result<(), ApiError> {
        let response = self.client.list_project_issues(project_id, 1, 100).await?;
        self.state
            .write()
            .issues
            .insert(project_id.to_string(), response.items);
        Ok(())
    }
}
