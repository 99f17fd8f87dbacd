use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error as ThisError;

use crate::grants_gov::UPSTREAM_BODY_PREVIEW_CHARS;

#[derive(Debug, ThisError)]
pub enum GrantDeskError {
    /// Request body or parameters failed validation.
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Unique key collision (opportunity number).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Keyword search needs a stored Grants.gov API key.
    #[error("No Grants.gov API key configured")]
    MissingApiKey,

    /// Upstream answered with a non-success HTTP status.
    #[error("Upstream error with status: {status}, body={body:.200}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// Upstream answered 2xx but flagged the call as failed in its envelope.
    #[error("Upstream rejected request: errorcode={code}, msg={message}")]
    UpstreamRejected { code: i64, message: String },

    #[error("Failed to parse upstream response: {0}")]
    UpstreamPayload(String),

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<JsonRejection> for GrantDeskError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => GrantDeskError::InvalidJson(e.body_text()),
            other => GrantDeskError::Validation(other.body_text()),
        }
    }
}

impl From<PathRejection> for GrantDeskError {
    fn from(rejection: PathRejection) -> Self {
        GrantDeskError::Validation(rejection.body_text())
    }
}

impl IntoResponse for GrantDeskError {
    fn into_response(self) -> Response {
        let (status, error_body) = match self {
            GrantDeskError::Validation(message) => {
                tracing::warn!(message = %message, "Request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ApiErrorObject::new("INVALID_REQUEST", message),
                )
            }

            GrantDeskError::InvalidJson(message) => {
                tracing::warn!(message = %message, "Request body is not valid JSON");
                (
                    StatusCode::BAD_REQUEST,
                    ApiErrorObject::new("INVALID_JSON", message),
                )
            }

            GrantDeskError::Conflict(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject::new("CONFLICT", message),
            ),

            GrantDeskError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject::new("NOT_FOUND", message),
            ),

            GrantDeskError::MissingApiKey => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject::new("MISSING_API_KEY", "No Grants.gov API key configured"),
            ),

            GrantDeskError::UpstreamStatus { status, body } => {
                let preview = format!("{:.len$}", body, len = UPSTREAM_BODY_PREVIEW_CHARS);
                tracing::warn!(
                    status = %status,
                    raw_body = %preview,
                    "Grants.gov returned non-success status"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject::new(
                        "UPSTREAM_ERROR",
                        format!("Grants.gov returned {}", status.as_u16()),
                    )
                    .with_details(json!({
                        "upstream_status": status.as_u16(),
                        "upstream_body": preview,
                    })),
                )
            }

            GrantDeskError::UpstreamRejected { code, message } => {
                tracing::warn!(errorcode = code, msg = %message, "Grants.gov rejected request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject::new("UPSTREAM_ERROR", "Grants.gov rejected the request.")
                        .with_details(json!({
                            "errorcode": code,
                            "msg": message,
                        })),
                )
            }

            GrantDeskError::UpstreamPayload(e) => {
                tracing::warn!(error = %e, "Grants.gov payload could not be parsed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject::new(
                        "BAD_UPSTREAM_PAYLOAD",
                        "Failed to parse upstream response.",
                    ),
                )
            }

            GrantDeskError::ReqwestError(e) => {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "Grants.gov request failed");
                let message = if e.is_timeout() {
                    "Grants.gov request timed out."
                } else {
                    "Grants.gov is unreachable."
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject::new("UPSTREAM_UNREACHABLE", message),
                )
            }

            GrantDeskError::RactorError(e) => {
                tracing::error!(error = %e, "Store actor error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiErrorObject::internal())
            }

            GrantDeskError::DatabaseError(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiErrorObject::internal())
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorObject {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal server error occurred.")
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
