//! Team and team membership endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::users::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    /// Short uppercase key used for issue numbering (e.g. `ENG-42`).
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub user_id: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamListResponse {
    pub teams: Vec<Team>,
    pub total: i64,
    pub page: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub key: String,
    pub description: String,
    pub workspace_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTeamRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: TeamRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMemberRoleRequest {
    pub role: TeamRole,
}

impl ApiClient {
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_teams(
        &self,
        workspace_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<TeamListResponse, ApiError> {
        self.get_json(&format!(
            "/teams?workspace_id={}&page={}&page_size={}",
            urlencoding::encode(workspace_id),
            page,
            page_size
        ))
        .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, ApiError> {
        self.post_json("/teams", request).await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn get_team(&self, team_id: &str) -> Result<Team, ApiError> {
        self.get_json(&format!("/teams/{}", urlencoding::encode(team_id)))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_team(
        &self,
        team_id: &str,
        request: &UpdateTeamRequest,
    ) -> Result<Team, ApiError> {
        self.put_json(&format!("/teams/{}", urlencoding::encode(team_id)), request)
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_team(&self, team_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/teams/{}", urlencoding::encode(team_id)))
            .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_team_members(&self, team_id: &str) -> Result<MemberListResponse, ApiError> {
        self.get_json(&format!("/teams/{}/members", urlencoding::encode(team_id)))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn add_team_member(
        &self,
        team_id: &str,
        request: &AddMemberRequest,
    ) -> Result<(), ApiError> {
        self.post_unit(
            &format!("/teams/{}/members", urlencoding::encode(team_id)),
            Some(request),
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn remove_team_member(&self, team_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!(
            "/teams/{}/members/{}",
            urlencoding::encode(team_id),
            urlencoding::encode(user_id)
        ))
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn update_team_member_role(
        &self,
        team_id: &str,
        user_id: &str,
        role: TeamRole,
    ) -> Result<(), ApiError> {
        self.put_unit(
            &format!(
                "/teams/{}/members/{}",
                urlencoding::encode(team_id),
                urlencoding::encode(user_id)
            ),
            &UpdateMemberRoleRequest { role },
        )
        .await
    }
}
