//! Team and membership state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::teams::{
    AddMemberRequest, CreateTeamRequest, Team, TeamMember, TeamRole, UpdateTeamRequest,
};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct TeamState {
    teams: Vec<Team>,
    members: HashMap<String, Vec<TeamMember>>,
    is_loading: bool,
    error: Option<String>,
}

pub struct TeamStore {
    client: Arc<ApiClient>,
    state: RwLock<TeamState>,
}

impl TeamStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(TeamState::default()),
        }
    }

    pub fn teams(&self) -> Vec<Team> {
        self.state.read().teams.clone()
    }

    pub fn team(&self, team_id: &str) -> Option<Team> {
        self.state.read().teams.iter().find(|t| t.id == team_id).cloned()
    }

    pub fn members_for(&self, team_id: &str) -> Vec<TeamMember> {
        self.state
            .read()
            .members
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

    pub async fn fetch_teams(&self, workspace_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.list_teams(workspace_id, 1, 100).await {
            Ok(response) => {
                let mut state = self.state.write();
                state.teams = response.teams;
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, ApiError> {
        self.begin();
        match self.client.create_team(request).await {
            Ok(team) => {
                let mut state = self.state.write();
                state.teams.push(team.clone());
                state.is_loading = false;
                Ok(team)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn update_team(
        &self,
        team_id: &str,
        request: &UpdateTeamRequest,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_team(team_id, request).await {
            Ok(updated) => {
                let mut state = self.state.write();
                if let Some(team) = state.teams.iter_mut().find(|t| t.id == team_id) {
                    *team = updated;
                }
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn delete_team(&self, team_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.delete_team(team_id).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.teams.retain(|t| t.id != team_id);
                state.members.remove(team_id);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn fetch_members(&self, team_id: &str) -> Result<(), ApiError> {
        let response = self.client.list_team_members(team_id).await?;
        self.state
            .write()
            .members
            .insert(team_id.to_string(), response.members);
        Ok(())
    }

    /// Membership mutations re-fetch the roster; the add/role endpoints
    /// return no row to patch in.
    pub async fn add_member(
        &self,
        team_id: &str,
        user_id: String,
        role: TeamRole,
    ) -> Result<(), ApiError> {
        self.client
            .add_team_member(team_id, &AddMemberRequest { user_id, role })
            .await?;
        self.fetch_members(team_id).await
    }

    pub async fn remove_member(&self, team_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.client.remove_team_member(team_id, user_id).await?;
        self.state
            .write()
            .members
            .entry(team_id.to_string())
            .or_default()
            .retain(|m| m.user_id != user_id);
        Ok(())
    }

    pub async fn change_member_role(
        &self,
        team_id: &str,
        user_id: &str,
        role: TeamRole,
    ) -> Result<(), ApiError> {
        self.client
            .update_team_member_role(team_id, user_id, role)
            .await?;
        self.fetch_members(team_id).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use traction_auth::MemoryTokenStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn team_json(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "workspace_id": "ws-1",
            "name": name,
            "key": "ENG",
            "description": "",
            "created_at": "2025-06-01T12:00:00Z",
            "updated_at": "2025-06-01T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_fetch_and_delete_team() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "teams": [team_json("team-1", "Engineering")], "total": 1, "page": 1 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/teams/team-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        let store = TeamStore::new(Arc::new(client));

        store.fetch_teams("ws-1").await.unwrap();
        assert_eq!(store.team("team-1").unwrap().name, "Engineering");

        store.delete_team("team-1").await.unwrap();
        assert!(store.teams().is_empty());
    }

    #[tokio::test]
    async fn test_remove_member_prunes_roster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "members": [{
                    "id": "tm-1",
                    "user_id": "usr-1",
                    "role": "member",
                    "joined_at": "2025-06-01T12:00:00Z"
                }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/teams/team-1/members/usr-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        let store = TeamStore::new(Arc::new(client));

        store.fetch_members("team-1").await.unwrap();
        assert_eq!(store.members_for("team-1").len(), 1);

        store.remove_member("team-1", "usr-1").await.unwrap();
        assert!(store.members_for("team-1").is_empty());
    }
}
