//! Notification inbox state and the unread badge.

use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::notifications::{
    BatchReadRequest, Notification, NotificationChannel, NotificationPreference,
    UpdatePreferenceRequest,
};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct NotificationState {
    notifications: Vec<Notification>,
    total: i64,
    unread_count: i64,
    preferences: Vec<NotificationPreference>,
    is_loading: bool,
    error: Option<String>,
}

pub struct NotificationStore {
    client: Arc<ApiClient>,
    state: RwLock<NotificationState>,
}

impl NotificationStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(NotificationState::default()),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.read().notifications.clone()
    }

    pub fn unread_count(&self) -> i64 {
        self.state.read().unread_count
    }

    pub fn preferences(&self) -> Vec<NotificationPreference> {
        self.state.read().preferences.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub async fn fetch_notifications(
        &self,
        page: i64,
        page_size: i64,
        read: Option<bool>,
    ) -> Result<(), ApiError> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        match self.client.list_notifications(page, page_size, read).await {
            Ok(response) => {
                let mut state = self.state.write();
                state.notifications = response.notifications;
                state.total = response.total;
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

    /// Poll the unread badge. Failures are swallowed; a stale badge beats
    /// an error banner during background polling.
    pub async fn refresh_unread_count(&self) {
        match self.client.unread_notification_count().await {
            Ok(response) => self.state.write().unread_count = response.count,
            Err(err) => tracing::debug!("unread count poll failed: {}", err),
        }
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.client.mark_notification_read(notification_id).await?;
        let mut state = self.state.write();
        if let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            if !notification.read {
                notification.read = true;
                state.unread_count = (state.unread_count - 1).max(0);
            }
        }
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.client.mark_all_notifications_read().await?;
        let mut state = self.state.write();
        for notification in &mut state.notifications {
            notification.read = true;
        }
        state.unread_count = 0;
        Ok(())
    }

    pub async fn batch_mark_read(&self, ids: Vec<String>) -> Result<(), ApiError> {
        let response = self
            .client
            .batch_mark_notifications_read(&BatchReadRequest { ids: ids.clone() })
            .await?;
        let mut state = self.state.write();
        for notification in &mut state.notifications {
            if ids.contains(&notification.id) {
                notification.read = true;
            }
        }
        state.unread_count = (state.unread_count - response.marked).max(0);
        Ok(())
    }

    pub async fn fetch_preferences(
        &self,
        channel: NotificationChannel,
    ) -> Result<(), ApiError> {
        let preferences = self.client.list_notification_preferences(channel).await?;
        self.state.write().preferences = preferences;
        Ok(())
    }

    pub async fn update_preference(
        &self,
        request: &UpdatePreferenceRequest,
    ) -> Result<(), ApiError> {
        let updated = self.client.update_notification_preference(request).await?;
        let mut state = self.state.write();
        match state.preferences.iter_mut().find(|p| {
            p.channel == updated.channel && p.notification_type == updated.notification_type
        }) {
            Some(preference) => *preference = updated,
            None => state.preferences.push(updated),
        }
        Ok(())
    }
}
