//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::header::{CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use parley_types::error::{AuthError, ChatError};

use crate::http::response::ApiResponse;

const INTERNAL_MESSAGE: &str = "Something went wrong";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Account and session failures.
    Auth(AuthError),
    /// Chat failures.
    Chat(ChatError),
    /// Missing or unusable session cookie.
    Unauthorized(&'static str),
    /// Throttled by the rate limiter.
    RateLimited { retry_after_secs: u64, message: String },
    /// Malformed request body.
    BadRequest(String),
    /// Generic internal error; the detail is logged, never returned.
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status, machine code and client-safe message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(AuthError::InvalidInput(e)) | AppError::Chat(ChatError::InvalidInput(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Auth(AuthError::DuplicateEmail) => (
                StatusCode::CONFLICT,
                "DUPLICATE_EMAIL",
                "User already registered".to_string(),
            ),
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            AppError::Auth(AuthError::InvalidOrExpiredToken) | AppError::Chat(ChatError::UserNotFound) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", (*msg).to_string()),
            AppError::Chat(ChatError::UpstreamRateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "UPSTREAM_RATE_LIMITED",
                "AI service quota exceeded, please try again later".to_string(),
            ),
            AppError::Chat(ChatError::UpstreamUnreachable(_)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
                "AI service is unavailable".to_string(),
            ),
            AppError::Chat(ChatError::Upstream(_)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Failed to get response from AI service".to_string(),
            ),
            AppError::RateLimited { message, .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Auth(AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Storage(_))
            | AppError::Chat(ChatError::Storage(_))
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::RateLimited { retry_after_secs, .. } => Some(*retry_after_secs),
            AppError::Chat(ChatError::UpstreamRateLimited {
                retry_after_ms: Some(ms),
            }) => Some(ms.div_ceil(1000)),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), code, "request rejected");
        }

        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0);
        let body = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"data":null,"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        let mut response = (status, [(CONTENT_TYPE, "application/json")], body).into_response();
        if let Some(secs) = self.retry_after_secs() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::error::{RepositoryError, ValidationError};

    #[test]
    fn validation_maps_to_400_with_message() {
        let err = AppError::from(AuthError::InvalidInput(ValidationError::EmailInvalid));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Please enter a valid email");
    }

    #[test]
    fn storage_detail_is_not_exposed() {
        let err = AppError::from(ChatError::Storage(RepositoryError::Query(
            "no such table: chat_turns".into(),
        )));
        let (status, _, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("chat_turns"));
    }

    #[test]
    fn upstream_variants_map_to_gateway_codes() {
        assert_eq!(
            AppError::from(ChatError::Upstream("x".into())).parts().0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(ChatError::UpstreamUnreachable("x".into())).parts().0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn unreachable_upstream_responds_bad_gateway() {
        let response =
            AppError::from(ChatError::UpstreamUnreachable("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(RETRY_AFTER).is_none());
    }

    #[test]
    fn upstream_rate_limit_sets_retry_after() {
        let response = AppError::from(ChatError::UpstreamRateLimited {
            retry_after_ms: Some(1500),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "2");
    }

    #[test]
    fn duplicate_email_is_conflict() {
        assert_eq!(AppError::from(AuthError::DuplicateEmail).parts().0, StatusCode::CONFLICT);
    }
}
