//! Session state: the signed-in user and whether a session exists.

use std::sync::Arc;

use parking_lot::RwLock;
use traction_client::auth::{LoginRequest, RegisterRequest};
use traction_client::users::{UpdateUserRequest, User};
use traction_client::{ApiClient, ApiError};

#[derive(Debug, Default)]
struct AuthState {
    user: Option<User>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
}

pub struct AuthStore {
    client: Arc<ApiClient>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
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

    fn establish(&self, user: User) {
        let mut state = self.state.write();
        state.user = Some(user);
        state.is_authenticated = true;
        state.is_loading = false;
        state.error = None;
    }

    fn fail(&self, err: &ApiError) {
        let mut state = self.state.write();
        state.user = None;
        state.is_authenticated = false;
        state.is_loading = false;
        state.error = Some(err.user_message());
    }

    pub async fn login(&self, email: String, password: String) -> Result<(), ApiError> {
        self.begin();
        match self.client.login(&LoginRequest { email, password }).await {
            Ok(user) => {
                self.establish(user);
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.register(&request).await {
            Ok(user) => {
                self.establish(user);
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// End the session. Server-side revocation is best-effort; local state
    /// is always cleared.
    pub async fn logout(&self) {
        self.client.logout().await;
        let mut state = self.state.write();
        state.user = None;
        state.is_authenticated = false;
        state.is_loading = false;
        state.error = None;
    }

    /// Decide session state at startup from stored credentials. No stored
    /// pair means unauthenticated without any network traffic.
    pub async fn check_auth(&self) {
        if !self.client.is_authenticated() {
            let mut state = self.state.write();
            state.user = None;
            state.is_authenticated = false;
            return;
        }
        self.begin();
        match self.client.current_user().await {
            Ok(user) => self.establish(user),
            Err(err) => {
                tracing::debug!("stored session rejected: {}", err);
                self.fail(&err);
            }
        }
    }

    /// Re-fetch the profile without touching the session flag on failure.
    pub async fn refresh_user(&self) -> Result<(), ApiError> {
        let user = self.client.current_user().await?;
        self.state.write().user = Some(user);
        Ok(())
    }

    pub async fn update_user(&self, request: &UpdateUserRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_current_user(request).await {
            Ok(user) => {
                self.establish(user);
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
    use traction_auth::{MemoryTokenStore, TokenPair};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        serde_json::json!({
            "id": "user-1",
            "workspace_id": "ws-1",
            "email": "dev@example.com",
            "username": "dev",
            "name": "Dev",
            "role": "member"
        })
    }

    #[tokio::test]
    async fn test_successful_login_establishes_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "access_token": "access-1",
                    "refresh_token": "refresh-1",
                    "user": user_json()
                }
            })))
            .mount(&server)
            .await;

        let client = Arc::new(ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new())));
        let store = AuthStore::new(client.clone());

        store.login("dev@example.com".into(), "secret".into()).await.unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().id, "user-1");
        assert!(store.error().is_none());
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_records_error_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "invalid email or password"})),
            )
            .mount(&server)
            .await;

        let client = Arc::new(ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new())));
        let store = AuthStore::new(client);

        let result = store.login("dev@example.com".into(), "wrong".into()).await;

        assert!(result.is_err());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        // The server's rejection reaches the user verbatim; a failed sign-in
        // must not read as an expired session.
        assert_eq!(store.error().as_deref(), Some("invalid email or password"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_check_auth_without_credentials_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Arc::new(ApiClient::new(server.uri(), Arc::new(MemoryTokenStore::new())));
        let store = AuthStore::new(client);

        store.check_auth().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_check_auth_restores_session_from_stored_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": user_json()
            })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::with_tokens(TokenPair {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
        }));
        let client = Arc::new(ApiClient::new(server.uri(), tokens));
        let store = AuthStore::new(client);

        store.check_auth().await;
        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().username, "dev");
    }
}
