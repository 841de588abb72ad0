use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::fmt;

/// Errors raised while talking to the survey API.
///
/// A `FetchError` always means the whole request for a survey failed. Failures
/// of individual detail lookups are absorbed by the fetcher and never become a
/// `FetchError`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The API answered with a non-success status code.
    Status { status: u16, body: String },
    /// The request never produced a response (connect, timeout, TLS, ...).
    Transport(String),
    /// The API answered 2xx but the payload did not have the expected shape.
    MalformedPayload(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { status, body } => {
                write!(f, "API responded with status: {} ({})", status, body)
            }
            FetchError::Transport(msg) => write!(f, "Request failed: {}", msg),
            FetchError::MalformedPayload(msg) => {
                write!(f, "Invalid response format from API: {}", msg)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Fetching survey data from the remote API failed.
    Fetch(FetchError),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Error interacting with an external API outside the metrics pipeline.
    ExternalApiError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Fetch(e) => write!(f, "Fetch error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and JSON body.
    ///
    /// Fetch failures carry the underlying message and a timestamp so the
    /// dashboard can report when the survey became unreachable.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Fetch(e) => {
                tracing::error!("Failed to fetch survey data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to fetch responses",
                        "details": e.to_string(),
                        "timestamp": Utc::now().to_rfc3339(),
                    }),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "success": false,
                        "error": "External service error",
                        "details": msg,
                    }),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.clone().into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
///
/// Used outside the metrics pipeline, where an upstream failure is reported
/// as an external API error rather than a failed metrics fetch.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, FetchError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::ExternalApiError(e.to_string())),
            context: context.into(),
        })
    }
}
