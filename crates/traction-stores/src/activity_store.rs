//! Per-issue activity feed cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::activities::Activity;
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Clone, Default)]
pub struct IssueActivities {
    pub activities: Vec<Activity>,
    pub total: i64,
    pub page: i64,
}

#[derive(Debug, Default)]
struct ActivityState {
    by_issue: HashMap<String, IssueActivities>,
    is_loading: bool,
    error: Option<String>,
}

pub struct ActivityStore {
    client: Arc<ApiClient>,
    state: RwLock<ActivityState>,
}

impl ActivityStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(ActivityState::default()),
        }
    }

    pub fn activities_for(&self, issue_id: &str) -> Vec<Activity> {
        self.state
            .read()
            .by_issue
            .get(issue_id)
            .map(|entry| entry.activities.clone())
            .unwrap_or_default()
    }

    pub fn total_for(&self, issue_id: &str) -> i64 {
        self.state
            .read()
            .by_issue
            .get(issue_id)
            .map(|entry| entry.total)
            .unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Fetch a page of the feed, optionally narrowed to activity type names.
    /// Page 1 replaces the cached feed; later pages append.
    pub async fn fetch_activities(
        &self,
        issue_id: &str,
        page: i64,
        page_size: i64,
        types: &[&str],
    ) -> Result<(), ApiError> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        match self
            .client
            .list_issue_activities(issue_id, page, page_size, types)
            .await
        {
            Ok(response) => {
                let mut state = self.state.write();
                let entry = state.by_issue.entry(issue_id.to_string()).or_default();
                if response.page <= 1 {
                    entry.activities = response.activities;
                } else {
                    entry.activities.extend(response.activities);
                }
                entry.total = response.total;
                entry.page = response.page;
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
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use traction_auth::MemoryTokenStore;
    use traction_client::activities::ActivityKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_type_filter_is_forwarded_and_payload_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/issues/iss-1/activities"))
            .and(query_param("types", "status_changed,comment_added"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "activities": [{
                        "id": "act-1",
                        "issue_id": "iss-1",
                        "actor_id": "usr-1",
                        "type": "comment_added",
                        "payload": { "comment_id": "c-1", "comment_preview": "looks good" },
                        "created_at": "2025-06-01T12:00:00Z"
                    }],
                    "total": 1,
                    "page": 1,
                    "page_size": 20
                }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        let store = ActivityStore::new(Arc::new(client));

        store
            .fetch_activities("iss-1", 1, 20, &["status_changed", "comment_added"])
            .await
            .unwrap();

        let activities = store.activities_for("iss-1");
        assert_eq!(activities.len(), 1);
        assert!(matches!(
            activities[0].kind,
            ActivityKind::CommentAdded { .. }
        ));
    }
}
