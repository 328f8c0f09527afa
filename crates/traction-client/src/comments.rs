//! Comment endpoints.
//!
//! Comments form a tree per issue: top-level comments have no `parent_id`,
//! replies nest arbitrarily deep under `replies`. The server returns the
//! nested shape; the client-side tree reducer lives in the stores crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub issue_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}

impl ApiClient {
    /// List an issue's comments as a nested tree, paginated at the top level.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_comments(
        &self,
        issue_id: &str,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<CommentListResponse, ApiError> {
        let mut path = format!("/issues/{}/comments", urlencoding::encode(issue_id));
        let mut sep = '?';
        if let Some(page) = page {
            path.push_str(&format!("{}page={}", sep, page));
            sep = '&';
        }
        if let Some(page_size) = page_size {
            path.push_str(&format!("{}page_size={}", sep, page_size));
        }
        self.get_json(&path).await
    }

    /// Create a top-level comment or, with `parent_id` set, a reply.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn create_comment(
        &self,
        issue_id: &str,
        request: &CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        self.post_json(
            &format!("/issues/{}/comments", urlencoding::encode(issue_id)),
            request,
        )
        .await
    }

    /// Replace a comment's body; the server stamps `edited_at`.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_comment(
        &self,
        comment_id: &str,
        request: &UpdateCommentRequest,
    ) -> Result<Comment, ApiError> {
        self.put_json(
            &format!("/comments/{}", urlencoding::encode(comment_id)),
            request,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/comments/{}", urlencoding::encode(comment_id)))
            .await
    }
}
