//! Authenticated HTTP client for the tracker API.
//!
//! Attaches the stored bearer token to every request and recovers from token
//! expiry transparently: the first 401 triggers a single refresh cycle, all
//! concurrently failing requests queue on it, and each request is retried at
//! most once with the new token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use traction_auth::{TokenPair, TokenStore};
use traction_core::Config;

use crate::error::ApiError;
use crate::refresh::{RefreshCoordinator, RefreshOutcome, RefreshRole};

const API_PREFIX: &str = "/api/v1";

/// Paths that must never trigger the refresh protocol: a 401 from these is
/// the terminal answer, not an expired access token.
const REFRESH_EXEMPT: &[&str] = &["/auth/login", "/auth/refresh"];

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error body shape for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh: RefreshCoordinator,
}

/// Shared, cloneable client for the tracker API.
///
/// Owns the credential lifecycle: login/register/refresh store the token
/// pair, logout and irrecoverable refresh failures clear it. Constructed once
/// at the composition root and passed to every store that performs I/O.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a client against `base_url` (without the `/api/v1` prefix).
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into();
        Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                tokens,
                refresh: RefreshCoordinator::new(),
            }),
        }
    }

    /// Create a client from loaded configuration, honoring the request
    /// timeout.
    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                tokens,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    /// Whether a credential pair is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.load().is_some()
    }

    /// Currently stored credential pair, if any.
    pub fn stored_tokens(&self) -> Option<TokenPair> {
        self.inner.tokens.load()
    }

    pub(crate) fn save_tokens(&self, pair: &TokenPair) {
        if let Err(err) = self.inner.tokens.save(pair) {
            tracing::warn!("Failed to persist credentials: {}", err);
        }
    }

    pub(crate) fn clear_tokens(&self) {
        self.inner.tokens.clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.inner.base_url, API_PREFIX, path)
    }

    fn is_refresh_exempt(path: &str) -> bool {
        REFRESH_EXEMPT.iter().any(|p| path.starts_with(p))
    }

    // ------------------------------------------------------------------
    // Typed request helpers used by the resource modules.
    // ------------------------------------------------------------------

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(to_body(body)?)).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(to_body(body)?)).await
    }

    pub(crate) async fn patch_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, Some(to_body(body)?)).await
    }

    /// POST where the caller does not need the response body.
    pub(crate) async fn post_unit<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let body = body.map(to_body).transpose()?;
        self.request_unit(Method::POST, path, body).await
    }

    /// PUT where the caller does not need the response body.
    pub(crate) async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.request_unit(Method::PUT, path, Some(to_body(body)?)).await
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        self.request_unit(Method::DELETE, path, None).await
    }

    /// Upload a single file as multipart form data.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &'static str,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<T, ApiError> {
        let response = self
            .execute_with_refresh(path, |token| {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                let form = reqwest::multipart::Form::new().part(field, part);
                let mut builder = self.inner.http.post(self.url(path)).multipart(form);
                if let Some(token) = token {
                    builder = builder.bearer_auth(token);
                }
                builder
            })
            .await?;

        decode_envelope(response).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        decode_envelope(response).await
    }

    async fn request_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), ApiError> {
        self.send(method, path, body).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        self.execute_with_refresh(path, |token| {
            let mut builder = self.inner.http.request(method.clone(), self.url(path));
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &body {
                builder = builder.json(body);
            }
            builder
        })
        .await
    }

    // ------------------------------------------------------------------
    // Refresh protocol
    // ------------------------------------------------------------------

    /// Send a request built by `build` (given the current access token) and,
    /// on a 401 from a non-exempt path, run the refresh protocol and retry
    /// exactly once. A second 401 after a successful refresh is terminal.
    async fn execute_with_refresh<F>(
        &self,
        path: &str,
        build: F,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(Option<&str>) -> reqwest::RequestBuilder,
    {
        let used_access = self.inner.tokens.load().map(|p| p.access_token);

        let response = build(used_access.as_deref()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED || Self::is_refresh_exempt(path) {
            return check_status(response).await;
        }

        tracing::debug!(path, "authorization failed, entering refresh protocol");

        let outcome = match self.inner.refresh.begin() {
            RefreshRole::Leader => self.run_refresh(used_access.as_deref()).await,
            // A dropped sender can only mean the leader's task died; treat it
            // as a failed refresh.
            RefreshRole::Follower(rx) => rx.await.unwrap_or(RefreshOutcome::Failed),
        };

        match outcome {
            RefreshOutcome::Refreshed(token) => {
                let retried = build(Some(&token)).send().await?;
                // A second 401 after a successful refresh is terminal.
                if retried.status() == StatusCode::UNAUTHORIZED {
                    return Err(ApiError::Unauthorized);
                }
                check_status(retried).await
            }
            RefreshOutcome::Failed => Err(ApiError::Unauthorized),
        }
    }

    /// Leader half of the protocol: call the refresh endpoint with the stored
    /// refresh token, persist the new pair, and publish the outcome. Always
    /// completes the coordinator so a later expiry can start a fresh cycle.
    async fn run_refresh(&self, used_access: Option<&str>) -> RefreshOutcome {
        let outcome = match self.inner.tokens.load() {
            // The stored token changed between our failure and winning
            // leadership: another cycle already refreshed. Reuse its result
            // instead of spending the refresh token again.
            Some(pair) if used_access.is_some() && used_access != Some(pair.access_token.as_str()) => {
                RefreshOutcome::Refreshed(pair.access_token)
            }
            Some(pair) => match self.call_refresh_endpoint(&pair.refresh_token).await {
                Ok(new_pair) => {
                    self.save_tokens(&new_pair);
                    tracing::info!("access token refreshed");
                    RefreshOutcome::Refreshed(new_pair.access_token)
                }
                Err(err) => {
                    tracing::warn!("token refresh failed: {}", err);
                    RefreshOutcome::Failed
                }
            },
            None => {
                tracing::debug!("no refresh token stored, abandoning refresh");
                RefreshOutcome::Failed
            }
        };

        if outcome == RefreshOutcome::Failed {
            self.clear_tokens();
        }
        self.inner.refresh.complete(outcome.clone());
        outcome
    }

    async fn call_refresh_endpoint(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self
            .inner
            .http
            .post(self.url("/auth/refresh"))
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        decode_envelope(response).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-2xx responses to [`ApiError`], surfacing the server's `message`
/// when the body carries one. 401s reach here only outside the refresh
/// protocol (exempt paths like login), where the server message is the
/// answer, not an expired session.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(envelope.data)
}
