//! Per-issue comment state.
//!
//! Holds each issue's comment tree plus the server-reported total. Mutations
//! go through the API first; the local tree is reduced only on success.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::comments::{Comment, CreateCommentRequest, UpdateCommentRequest};
use traction_client::{ApiClient, ApiError};

use crate::comment_tree;

#[derive(Debug, Clone, Default)]
pub struct IssueComments {
    pub comments: Vec<Comment>,
    pub total: i64,
}

#[derive(Debug, Default)]
struct CommentState {
    by_issue: HashMap<String, IssueComments>,
    is_loading: bool,
    error: Option<String>,
}

pub struct CommentStore {
    client: Arc<ApiClient>,
    state: RwLock<CommentState>,
}

impl CommentStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(CommentState::default()),
        }
    }

    pub fn comments_for(&self, issue_id: &str) -> Vec<Comment> {
        self.state
            .read()
            .by_issue
            .get(issue_id)
            .map(|entry| entry.comments.clone())
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

    /// Replace an issue's tree with a fresh page from the server.
    pub async fn fetch_comments(
        &self,
        issue_id: &str,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.list_comments(issue_id, page, page_size).await {
            Ok(response) => {
                let mut state = self.state.write();
                state.by_issue.insert(
                    issue_id.to_string(),
                    IssueComments {
                        comments: response.comments,
                        total: response.total,
                    },
                );
                state.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Post a comment or reply and place it in the local tree. A reply whose
    /// parent has scrolled out of the loaded page stays server-side only; the
    /// total still counts it.
    pub async fn add_comment(
        &self,
        issue_id: &str,
        body: String,
        parent_id: Option<String>,
    ) -> Result<Comment, ApiError> {
        self.begin();
        let request = CreateCommentRequest { body, parent_id };
        match self.client.create_comment(issue_id, &request).await {
            Ok(comment) => {
                let mut state = self.state.write();
                let entry = state.by_issue.entry(issue_id.to_string()).or_default();
                if !comment_tree::insert(&mut entry.comments, comment.clone()) {
                    tracing::debug!(comment = %comment.id, "reply parent not loaded, not displayed");
                }
                entry.total += 1;
                state.is_loading = false;
                Ok(comment)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn edit_comment(
        &self,
        issue_id: &str,
        comment_id: &str,
        body: String,
    ) -> Result<(), ApiError> {
        self.begin();
        let request = UpdateCommentRequest { body };
        match self.client.update_comment(comment_id, &request).await {
            Ok(updated) => {
                let mut state = self.state.write();
                if let Some(entry) = state.by_issue.get_mut(issue_id) {
                    comment_tree::update(&mut entry.comments, updated);
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

    /// Delete a comment. The server cascades to replies; the local total
    /// drops by one regardless of how many descendants went with it, so it
    /// can overcount until the next fetch.
    pub async fn delete_comment(&self, issue_id: &str, comment_id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.client.delete_comment(comment_id).await {
            Ok(()) => {
                let mut state = self.state.write();
                if let Some(entry) = state.by_issue.get_mut(issue_id) {
                    comment_tree::remove(&mut entry.comments, comment_id);
                    entry.total = (entry.total - 1).max(0);
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
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use traction_auth::MemoryTokenStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn comment_json(id: &str, parent_id: Option<&str>, replies: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "issue_id": "iss-1",
            "parent_id": parent_id,
            "user_id": "usr-1",
            "body": format!("body of {}", id),
            "created_at": "2025-06-01T12:00:00Z",
            "updated_at": "2025-06-01T12:00:00Z",
            "replies": replies
        })
    }

    fn store_for(server: &MockServer) -> CommentStore {
        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        CommentStore::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_reply_lands_after_existing_replies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "comments": [comment_json("c1", None, serde_json::json!([
                        comment_json("r1", Some("c1"), serde_json::json!([])),
                        comment_json("r2", Some("c1"), serde_json::json!([])),
                    ]))],
                    "total": 3,
                    "page": 1,
                    "page_size": 50
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": comment_json("r3", Some("c1"), serde_json::json!([]))
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_comments("iss-1", None, None).await.unwrap();
        store
            .add_comment("iss-1", "a reply".into(), Some("c1".into()))
            .await
            .unwrap();

        let comments = store.comments_for("iss-1");
        let replies: Vec<&str> = comments[0].replies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(replies, ["r1", "r2", "r3"]);
        assert_eq!(store.total_for("iss-1"), 4);
    }

    #[tokio::test]
    async fn test_new_top_level_comment_shows_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "comments": [comment_json("c1", None, serde_json::json!([]))],
                    "total": 1,
                    "page": 1,
                    "page_size": 50
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": comment_json("c2", None, serde_json::json!([]))
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_comments("iss-1", None, None).await.unwrap();
        store.add_comment("iss-1", "newest".into(), None).await.unwrap();

        let comments = store.comments_for("iss-1");
        assert_eq!(comments[0].id, "c2");
    }

    #[tokio::test]
    async fn test_delete_drops_subtree_but_total_by_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "comments": [comment_json("c1", None, serde_json::json!([
                        comment_json("r1", Some("c1"), serde_json::json!([])),
                    ]))],
                    "total": 2,
                    "page": 1,
                    "page_size": 50
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/comments/c1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_comments("iss-1", None, None).await.unwrap();
        store.delete_comment("iss-1", "c1").await.unwrap();

        assert!(store.comments_for("iss-1").is_empty());
        // The reply went with the subtree but only the direct delete is
        // subtracted; the count self-corrects on the next fetch.
        assert_eq!(store.total_for("iss-1"), 1);
    }

    #[tokio::test]
    async fn test_delete_of_unloaded_comment_never_goes_negative() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "comments": [], "total": 0, "page": 1, "page_size": 50 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/comments/c9"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_comments("iss-1", None, None).await.unwrap();
        // The comment lives outside the loaded page; the cached total floors
        // at zero instead of going negative.
        store.delete_comment("iss-1", "c9").await.unwrap();
        assert_eq!(store.total_for("iss-1"), 0);
    }

    #[tokio::test]
    async fn test_failed_add_records_error_and_leaves_tree() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/issues/iss-1/comments"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "comment body cannot be empty"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let result = store.add_comment("iss-1", String::new(), None).await;

        assert!(result.is_err());
        assert!(!store.is_loading());
        assert_eq!(
            store.error().as_deref(),
            Some("comment body cannot be empty")
        );
        assert!(store.comments_for("iss-1").is_empty());
    }
}
