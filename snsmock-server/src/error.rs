//! Server error types.

use hyper::StatusCode;
use snsmock_core::CaptureError;
use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server shutting down")]
    ShuttingDown,
}

/// Maps a capture error to the HTTP status the SDK and the verification
/// API expect: 400 for client faults, 404 for missing records, 500
/// otherwise.
pub fn http_status(error: &CaptureError) -> StatusCode {
    match error {
        CaptureError::MissingAction
        | CaptureError::InvalidAction { .. }
        | CaptureError::InvalidParameter { .. }
        | CaptureError::NullTopic
        | CaptureError::NullMessageId => StatusCode::BAD_REQUEST,
        CaptureError::NotFound { .. } => StatusCode::NOT_FOUND,
        CaptureError::NullMessage | CaptureError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
