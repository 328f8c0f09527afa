//! API-specific error types.

use thiserror::Error;
use traction_core::{AppError, AuthError, NetworkError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Authorization failed and could not be recovered by a token refresh.
    #[error("Not authorized")]
    Unauthorized,

    /// The server rejected the request; `message` is the server-provided
    /// message when the body carried one, otherwise derived from the status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-friendly message for UI display.
    ///
    /// Validation/business failures surface the server message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Decode(_) => "Received an unexpected response. Please try again.".to_string(),
        }
    }

    /// Whether this failure means the session is gone.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Mapping into the application-level hierarchy, for callers composing this
/// client with other subsystems.
impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => AuthError::SessionExpired.into(),
            // A 401 outside the refresh protocol is a credential rejection,
            // not an expired session.
            ApiError::Api { status: 401, .. } => AuthError::InvalidCredentials.into(),
            ApiError::Api { status, message } => {
                NetworkError::ServerError { status, message }.into()
            }
            ApiError::Network(err) if err.is_timeout() => NetworkError::Timeout.into(),
            ApiError::Network(err) => NetworkError::ConnectionFailed(err.to_string()).into(),
            ApiError::Decode(message) => NetworkError::InvalidResponse(message).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_api_error_surfaces_server_message_verbatim() {
        let err = ApiError::Api {
            status: 422,
            message: "title is required".to_string(),
        };
        assert_eq!(err.user_message(), "title is required");
    }

    #[test]
    fn test_auth_failure_detection() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(!ApiError::Api {
            status: 404,
            message: "not found".into()
        }
        .is_auth_failure());
    }

    #[test]
    fn test_app_error_mapping() {
        let expired: AppError = ApiError::Unauthorized.into();
        assert!(matches!(expired, AppError::Auth(AuthError::SessionExpired)));

        let rejected: AppError = ApiError::Api {
            status: 401,
            message: "invalid email or password".into(),
        }
        .into();
        assert!(matches!(
            rejected,
            AppError::Auth(AuthError::InvalidCredentials)
        ));

        let server: AppError = ApiError::Api {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert!(matches!(
            server,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));

        let decode: AppError = ApiError::Decode("truncated body".into()).into();
        assert!(matches!(
            decode,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }
}
