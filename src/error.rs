//! Error types for the relay and for process startup.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned to callers when the upstream call exceeds its time bound.
pub const TIMEOUT_MESSAGE: &str =
    "The transformation took too long. Try again with a smaller image.";

/// Message returned alongside verbatim upstream error bodies.
pub const UPSTREAM_MESSAGE: &str = "Error during transformation";

/// Everything that can go wrong while handling a single transform request.
///
/// Serializable so replayed cassettes can reproduce failures exactly.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformError {
    /// No Stability API key is configured.
    #[error("Server configuration incomplete - STABILITY_API_KEY missing")]
    MissingApiKey,

    /// The uploaded bytes could not be decoded as an image.
    #[error("Failed to decode image: {reason}")]
    InvalidImage {
        /// Decoder error text.
        reason: String,
    },

    /// The upstream API answered with a non-success status.
    #[error("Upstream error ({status}): {body}")]
    Upstream {
        /// HTTP status code returned upstream.
        status: u16,
        /// Raw upstream response body.
        body: String,
    },

    /// The upstream call exceeded its time bound.
    #[error("Upstream request timed out after {after_secs}s")]
    Timeout {
        /// The bound that was exceeded, in seconds.
        after_secs: u64,
    },

    /// Any other failure: encoding, transport, malformed upstream payload.
    #[error("{reason}")]
    Unexpected {
        /// Description of the failure.
        reason: String,
    },
}

impl TransformError {
    /// Shorthand for [`TransformError::Unexpected`].
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected { reason: reason.into() }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingApiKey | Self::InvalidImage { .. } | Self::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// JSON body this error is reported with.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::MissingApiKey => ErrorBody::new(self.to_string()),
            Self::InvalidImage { .. } | Self::Unexpected { .. } => {
                ErrorBody::new(format!("Server error: {self}"))
            }
            Self::Upstream { body, .. } => ErrorBody {
                details: Some(body.clone()),
                ..ErrorBody::new(UPSTREAM_MESSAGE)
            },
            Self::Timeout { .. } => ErrorBody::new(TIMEOUT_MESSAGE),
        }
    }
}

impl IntoResponse for TransformError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// JSON error payload: `{status: "error", message, details?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `"error"`.
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Raw upstream body, for upstream failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Error payload with the given message and no details.
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: "error".to_string(), message: message.into(), details: None }
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O error occurred (binding, serving).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cassette could not be loaded or saved.
    #[error("Cassette error: {0}")]
    Cassette(#[from] crate::cassette::CassetteError),

    /// A recording session was finished while adapters still held the recorder.
    #[error("Recording adapter still has references")]
    RecorderInUse,

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
