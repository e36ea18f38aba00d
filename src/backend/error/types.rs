/**
 * Backend Error Types
 *
 * This module defines the two error families the server uses:
 *
 * - `PipelineError` - typed, stage-tagged failures inside the edit pipeline.
 *   Every pipeline error is terminal for exactly one queued message: the
 *   worker logs it together with the failing stage and drops the message.
 *   No retry, no partial broadcast, no in-band notification to the sender.
 *
 * - `ApiError` - failures on the HTTP surface (auth, document CRUD). These
 *   convert to structured JSON error envelopes via `IntoResponse`.
 *
 * Transport failures never appear here: a broken WebSocket removes its
 * connection inside the connection/pool layer and is invisible to workers
 * and the broadcaster.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Terminal failure of one message in the edit pipeline
///
/// Each variant corresponds to one stage of the worker pipeline, so tests
/// and log lines can name the exact failure kind instead of matching
/// message text.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The raw frame was not a valid edit event
    #[error("failed to decode edit frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field was empty
    #[error("missing required field '{field}'")]
    MissingField {
        /// Name of the empty field
        field: &'static str,
    },

    /// `doc_id` did not parse as a numeric document ID
    #[error("invalid document id '{0}'")]
    InvalidDocumentId(String),

    /// The target document does not exist
    #[error("document {0} not found")]
    NotFound(i64),

    /// The operation's position/length fell outside the document content
    #[error("position {position} with length {length} out of range for content of {content_len} chars")]
    OutOfRange {
        /// Submitted character offset
        position: i64,
        /// Submitted extent
        length: i64,
        /// Character length of the document content at check time
        content_len: usize,
    },

    /// The operation tag is not insert/delete/replace
    #[error("unsupported operation '{0}'")]
    UnsupportedOperation(String),

    /// The atomic save-and-append unit failed and rolled back
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl PipelineError {
    /// Name of the pipeline stage this error belongs to
    ///
    /// Used in worker log lines so a dropped message names where it died.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::MissingField { .. } => "validate",
            Self::InvalidDocumentId(_) | Self::NotFound(_) => "transform",
            Self::OutOfRange { .. } | Self::UnsupportedOperation(_) => "apply",
            Self::Storage(_) => "persist",
        }
    }
}

/// Error on the HTTP surface (auth and document CRUD)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation or referenced something that is not there
    #[error("{message}")]
    Handler {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// A service this route needs is not configured
    #[error("{0} is not available")]
    Unavailable(&'static str),

    /// Storage failure behind a CRUD route
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Shared frame/validation failure surfaced over HTTP
    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl ApiError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// Shorthand for a 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// Shorthand for a 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handler { status, .. } => *status,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shared(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::Shared(SharedError::SerializationError { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_stage_tags() {
        let decode = PipelineError::Decode(serde_json::from_str::<i32>("x").unwrap_err());
        assert_eq!(decode.stage(), "decode");
        assert_eq!(PipelineError::MissingField { field: "doc_id" }.stage(), "validate");
        assert_eq!(PipelineError::InvalidDocumentId("abc".into()).stage(), "transform");
        assert_eq!(PipelineError::NotFound(9).stage(), "transform");
        let oob = PipelineError::OutOfRange {
            position: 1,
            length: 5,
            content_len: 3,
        };
        assert_eq!(oob.stage(), "apply");
        assert_eq!(PipelineError::UnsupportedOperation("upsert".into()).stage(), "apply");
    }

    #[test]
    fn test_out_of_range_display_names_bounds() {
        let err = PipelineError::OutOfRange {
            position: 1,
            length: 5,
            content_len: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("position 1"));
        assert!(msg.contains("length 5"));
        assert!(msg.contains("3 chars"));
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unavailable("database").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_shared_validation_maps_to_bad_request() {
        let err: ApiError = SharedError::validation("title", "empty").into();
        assert_matches!(err, ApiError::Shared(_));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
