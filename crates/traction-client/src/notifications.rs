//! Notification and notification-preference endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    IssueAssigned,
    IssueStatusChanged,
    IssueCommented,
    CommentReply,
    IssueMentioned,
    IssueDueSoon,
    IssueSubscribed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub issue_id: Option<String>,
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReadRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchReadResponse {
    pub message: String,
    pub marked: i64,
}

/// Delivery channel a preference applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub channel: NotificationChannel,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatePreferenceRequest {
    pub channel: NotificationChannel,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub enabled: bool,
}

impl ApiClient {
    /// List the current user's notifications, optionally filtered by read state.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_notifications(
        &self,
        page: i64,
        page_size: i64,
        read: Option<bool>,
    ) -> Result<NotificationListResponse, ApiError> {
        let mut path = format!("/notifications?page={}&page_size={}", page, page_size);
        if let Some(read) = read {
            path.push_str(&format!("&read={}", read));
        }
        self.get_json(&path).await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn unread_notification_count(&self) -> Result<UnreadCountResponse, ApiError> {
        self.get_json("/notifications/unread-count").await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.post_unit::<()>(
            &format!(
                "/notifications/{}/read",
                urlencoding::encode(notification_id)
            ),
            None,
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.post_unit::<()>("/notifications/read-all", None).await
    }

    /// Mark a batch of notifications read; returns how many the server marked.
    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn batch_mark_notifications_read(
        &self,
        request: &BatchReadRequest,
    ) -> Result<BatchReadResponse, ApiError> {
        self.post_json("/notifications/batch-read", request).await
    }

    #[tracing::instrument(skip(self), level = "info")]
    pub async fn list_notification_preferences(
        &self,
        channel: NotificationChannel,
    ) -> Result<Vec<NotificationPreference>, ApiError> {
        let channel = match channel {
            NotificationChannel::InApp => "in_app",
            NotificationChannel::Email => "email",
        };
        self.get_json(&format!("/notification-preferences?channel={}", channel))
            .await
    }

    #[tracing::instrument(skip(self, request), level = "info")]
    pub async fn update_notification_preference(
        &self,
        request: &UpdatePreferenceRequest,
    ) -> Result<NotificationPreference, ApiError> {
        self.put_json("/notification-preferences", request).await
    }
}
