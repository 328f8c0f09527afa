//! Issue state: a keyed record map plus per-team orderings.
//!
//! Issues are cached once and addressed by id; team listings hold id lists
//! into the map so an issue updated from any screen is updated everywhere.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::issues::{
    CreateIssueRequest, Issue, IssueFilter, IssueSubscriber, UpdateIssueRequest,
    UpdatePositionRequest,
};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct IssueState {
    issues: HashMap<String, Issue>,
    by_team: HashMap<String, Vec<String>>,
    current_issue_id: Option<String>,
    subscribers: HashMap<String, Vec<IssueSubscriber>>,
    filter: IssueFilter,
    total: i64,
    is_loading: bool,
    error: Option<String>,
}

pub struct IssueStore {
    client: Arc<ApiClient>,
    state: RwLock<IssueState>,
}

impl IssueStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(IssueState::default()),
        }
    }

    pub fn issue(&self, issue_id: &str) -> Option<Issue> {
        self.state.read().issues.get(issue_id).cloned()
    }

    pub fn team_issues(&self, team_id: &str) -> Vec<Issue> {
        let state = self.state.read();
        state
            .by_team
            .get(team_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.issues.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn current_issue(&self) -> Option<Issue> {
        let state = self.state.read();
        state
            .current_issue_id
            .as_ref()
            .and_then(|id| state.issues.get(id).cloned())
    }

    pub fn subscribers_for(&self, issue_id: &str) -> Vec<IssueSubscriber> {
        self.state
            .read()
            .subscribers
            .get(issue_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn filter(&self) -> IssueFilter {
        self.state.read().filter.clone()
    }

    pub fn total(&self) -> i64 {
        self.state.read().total
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn set_filter(&self, filter: IssueFilter) {
        self.state.write().filter = filter;
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

    /// Fetch a team's issue page using the current filter.
    pub async fn fetch_team_issues(
        &self,
        team_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<(), ApiError> {
        self.begin();
        let filter = self.filter();
        match self
            .client
            .list_issues(team_id, Some(&filter), page, page_size)
            .await
        {
            Ok(response) => {
                let mut state = self.state.write();
                let ids = response.issues.iter().map(|i| i.id.clone()).collect();
                for issue in response.issues {
                    state.issues.insert(issue.id.clone(), issue);
                }
                state.by_team.insert(team_id.to_string(), ids);
                state.total = response.total;
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn fetch_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.get_issue(issue_id).await {
            Ok(issue) => {
                let mut state = self.state.write();
                state.current_issue_id = Some(issue.id.clone());
                state.issues.insert(issue.id.clone(), issue);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Create an issue; the new record lands at the top of its team's list.
    pub async fn create_issue(
        &self,
        team_id: &str,
        request: &CreateIssueRequest,
    ) -> Result<Issue, ApiError> {
        self.begin();
        match self.client.create_issue(team_id, request).await {
            Ok(issue) => {
                let mut state = self.state.write();
                state
                    .by_team
                    .entry(team_id.to_string())
                    .or_default()
                    .insert(0, issue.id.clone());
                state.issues.insert(issue.id.clone(), issue.clone());
                state.total += 1;
                state.is_loading = false;
                Ok(issue)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn update_issue(
        &self,
        issue_id: &str,
        request: &UpdateIssueRequest,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_issue(issue_id, request).await {
            Ok(issue) => {
                let mut state = self.state.write();
                state.issues.insert(issue.id.clone(), issue);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Soft-delete an issue and drop it from local listings.
    pub async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.delete_issue(issue_id).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.issues.remove(issue_id);
                for ids in state.by_team.values_mut() {
                    ids.retain(|id| id != issue_id);
                }
                state.subscribers.remove(issue_id);
                if state.current_issue_id.as_deref() == Some(issue_id) {
                    state.current_issue_id = None;
                }
                state.total = (state.total - 1).max(0);
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Undo a soft delete, then re-fetch the record into the cache.
    pub async fn restore_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.client.restore_issue(issue_id).await?;
        self.fetch_issue(issue_id).await
    }

    /// Move an issue on the board. Position (and status, when crossing
    /// columns) is applied locally after the server accepts it.
    pub async fn move_issue(
        &self,
        issue_id: &str,
        position: f64,
        status_id: Option<String>,
    ) -> Result<(), ApiError> {
        let request = UpdatePositionRequest {
            position,
            status_id: status_id.clone(),
        };
        self.client.update_issue_position(issue_id, &request).await?;
        let mut state = self.state.write();
        if let Some(issue) = state.issues.get_mut(issue_id) {
            issue.position = position;
            if let Some(status_id) = status_id {
                issue.status_id = status_id;
            }
        }
        Ok(())
    }

    pub async fn subscribe(&self, issue_id: &str) -> Result<(), ApiError> {
        self.client.subscribe_issue(issue_id).await?;
        self.fetch_subscribers(issue_id).await
    }

    pub async fn unsubscribe(&self, issue_id: &str) -> Result<(), ApiError> {
        self.client.unsubscribe_issue(issue_id).await?;
        self.fetch_subscribers(issue_id).await
    }

    pub async fn fetch_subscribers(&self, issue_id: &str) -> Result<(), ApiError> {
        let response = self.client.list_issue_subscribers(issue_id).await?;
        self.state
            .write()
            .subscribers
            .insert(issue_id.to_string(), response.subscribers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use traction_auth::MemoryTokenStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue_json(id: &str, title: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "team_id": "team-1",
            "number": 1,
            "title": title,
            "status_id": "st-1",
            "priority": 0,
            "position": 1.0,
            "created_at": "2025-06-01T12:00:00Z",
            "updated_at": "2025-06-01T12:00:00Z",
            "created_by": "usr-1"
        })
    }

    fn store_for(server: &MockServer) -> IssueStore {
        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        IssueStore::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_fetched_issues_are_independently_addressable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "issues": [issue_json("iss-1", "First"), issue_json("iss-2", "Second")],
                    "total": 2,
                    "page": 1
                }
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_team_issues("team-1", 1, 50).await.unwrap();

        assert_eq!(store.issue("iss-1").unwrap().title, "First");
        assert_eq!(store.issue("iss-2").unwrap().title, "Second");
        assert_eq!(store.team_issues("team-1").len(), 2);
        assert_eq!(store.total(), 2);
    }

    #[tokio::test]
    async fn test_update_is_visible_through_team_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "issues": [issue_json("iss-1", "Old title")], "total": 1, "page": 1 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/issues/iss-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": issue_json("iss-1", "New title")
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_team_issues("team-1", 1, 50).await.unwrap();
        store
            .update_issue(
                "iss-1",
                &UpdateIssueRequest {
                    title: Some("New title".into()),
                    ..UpdateIssueRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.team_issues("team-1")[0].title, "New title");
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_listing_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "issues": [issue_json("iss-1", "Doomed")], "total": 1, "page": 1 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/issues/iss-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_team_issues("team-1", 1, 50).await.unwrap();
        store.delete_issue("iss-1").await.unwrap();

        assert!(store.issue("iss-1").is_none());
        assert!(store.team_issues("team-1").is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_uncached_issue_never_goes_negative() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/issues/iss-9"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.delete_issue("iss-9").await.unwrap();
        assert_eq!(store.total(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/issues"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "database unavailable"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let result = store.fetch_team_issues("team-1", 1, 50).await;

        assert!(result.is_err());
        assert!(!store.is_loading());
        assert_eq!(store.error().as_deref(), Some("database unavailable"));
    }
}
