//! Typed client for the Traction tracker API.
//!
//! Provides an authenticated HTTP client with transparent token refresh and
//! per-resource request wrappers over the `/api/v1` REST surface.

pub mod activities;
pub mod auth;
pub mod comments;
pub mod error;
pub mod http;
pub mod issues;
pub mod labels;
pub mod notifications;
pub mod projects;
pub mod refresh;
pub mod teams;
pub mod users;
pub mod workflows;
pub mod workspaces;

pub use error::ApiError;
pub use http::ApiClient;
pub use refresh::{RefreshCoordinator, RefreshOutcome, RefreshRole};
