//! Shared API types
//!
//! Error responses and query parameter validation shared by all endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::ValidationError;

use crate::core::constants::{QUERY_DEFAULT_LIMIT, QUERY_MAX_LIMIT};
use crate::data::DataError;

/// Validator function for limit parameter
pub fn validate_limit(limit: u32) -> Result<(), ValidationError> {
    if limit == 0 || limit > QUERY_MAX_LIMIT {
        return Err(ValidationError::new("limit_range")
            .with_message(format!("Limit must be between 1 and {}", QUERY_MAX_LIMIT).into()));
    }
    Ok(())
}

pub fn default_limit() -> u32 {
    QUERY_DEFAULT_LIMIT
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    NotFound { code: String, message: String },
    BadGateway { code: String, message: String },
    GatewayTimeout { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a data layer failure to a response. Remote details stay in the logs.
    pub fn from_data(e: DataError) -> Self {
        tracing::error!(error = %e, backend = e.backend(), "Remote query failed");
        match e {
            DataError::Timeout { .. } => Self::GatewayTimeout {
                message: "Remote query timed out".to_string(),
            },
            DataError::MalformedResponse { .. } => Self::BadGateway {
                code: "REMOTE_RESPONSE_INVALID".to_string(),
                message: "Remote query returned an unreadable response".to_string(),
            },
            DataError::Transport { .. } | DataError::Remote { .. } => Self::BadGateway {
                code: "REMOTE_QUERY_FAILED".to_string(),
                message: "Remote query failed".to_string(),
            },
            DataError::Config(_) => Self::internal("Query backend misconfigured"),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        Self::from_data(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::BadGateway { code, message } => {
                (StatusCode::BAD_GATEWAY, "bad_gateway", code, message)
            }
            Self::GatewayTimeout { message } => (
                StatusCode::GATEWAY_TIMEOUT,
                "gateway_timeout",
                "REMOTE_TIMEOUT".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
