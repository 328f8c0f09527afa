//! Label cache per team.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::labels::{CreateLabelRequest, Label, UpdateLabelRequest};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct LabelState {
    by_team: HashMap<String, Vec<Label>>,
    is_loading: bool,
    error: Option<String>,
}

pub struct LabelStore {
    client: Arc<ApiClient>,
    state: RwLock<LabelState>,
}

impl LabelStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(LabelState::default()),
        }
    }

    pub fn labels_for(&self, team_id: &str) -> Vec<Label> {
        self.state
            .read()
            .by_team
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

    pub async fn fetch_labels(&self, team_id: &str) -> Result<(), ApiError> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        match self.client.list_labels(team_id).await {
            Ok(labels) => {
                let mut state = self.state.write();
                state.by_team.insert(team_id.to_string(), labels);
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

    pub async fn create_label(
        &self,
        team_id: &str,
        request: &CreateLabelRequest,
    ) -> Result<Label, ApiError> {
        let label = self.client.create_label(team_id, request).await?;
        self.state
            .write()
            .by_team
            .entry(team_id.to_string())
            .or_default()
            .push(label.clone());
        Ok(label)
    }

    pub async fn update_label(
        &self,
        team_id: &str,
        label_id: &str,
        request: &UpdateLabelRequest,
    ) -> Result<(), ApiError> {
        let updated = self.client.update_label(label_id, request).await?;
        let mut state = self.state.write();
        if let Some(labels) = state.by_team.get_mut(team_id) {
            if let Some(label) = labels.iter_mut().find(|l| l.id == label_id) {
                *label = updated;
            }
        }
        Ok(())
    }

    pub async fn delete_label(&self, team_id: &str, label_id: &str) -> Result<(), ApiError> {
        self.client.delete_label(label_id).await?;
        self.state
            .write()
            .by_team
            .entry(team_id.to_string())
            .or_default()
            .retain(|l| l.id != label_id);
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

    #[tokio::test]
    async fn test_create_appends_to_team_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/teams/team-1/labels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/teams/team-1/labels"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {
                    "id": "lbl-1",
                    "workspace_id": "ws-1",
                    "team_id": "team-1",
                    "name": "bug",
                    "color": "#eb5757",
                    "created_at": "2025-06-01T12:00:00Z",
                    "updated_at": "2025-06-01T12:00:00Z"
                }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new()));
        let store = LabelStore::new(Arc::new(client));

        store.fetch_labels("team-1").await.unwrap();
        store
            .create_label(
                "team-1",
                &CreateLabelRequest {
                    name: "bug".into(),
                    color: Some("#eb5757".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.labels_for("team-1")[0].name, "bug");
    }
}
