//! The capture error taxonomy.

use thiserror::Error;

/// Errors raised by the capture store and the publish wire layer.
///
/// This is a closed set. The codes returned by [`CaptureError::code`] appear
/// in SDK-facing error envelopes and in verification API responses, so they
/// must remain stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// A record was submitted for insert without an id or topic.
    #[error("message must have a non-empty id and topic")]
    NullMessage,

    /// A by-topic query was issued with an empty topic.
    #[error("topic must not be null or empty")]
    NullTopic,

    /// A by-id query was issued with an empty id.
    #[error("message id must not be null or empty")]
    NullMessageId,

    /// A by-id query found no live record.
    #[error("no message found with id '{id}'")]
    NotFound { id: String },

    /// Neither an `Action` field nor an `X-Amz-Target` header was present.
    #[error("Could not find operation to perform.")]
    MissingAction,

    /// The requested action is not one the mock reproduces.
    #[error("invalid or unsupported action: {action}")]
    InvalidAction { action: String },

    /// A required field of a supported action is missing or malformed.
    #[error("required parameter missing or invalid: {parameter}")]
    InvalidParameter { parameter: String },

    /// Any other failure during handling.
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl CaptureError {
    /// Returns the stable code used in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::NullMessage => "NullMessage",
            CaptureError::NullTopic => "NullTopic",
            CaptureError::NullMessageId => "NullMessageId",
            CaptureError::NotFound { .. } => "NotFound",
            CaptureError::MissingAction => "MissingAction",
            CaptureError::InvalidAction { .. } => "InvalidAction",
            CaptureError::InvalidParameter { .. } => "InvalidParameter",
            CaptureError::Internal { .. } => "InternalError",
        }
    }

    /// Shorthand for an invalid-parameter error naming `parameter`.
    pub fn invalid_parameter(parameter: impl Into<String>) -> Self {
        CaptureError::InvalidParameter {
            parameter: parameter.into(),
        }
    }

    /// Shorthand for an internal error with `reason`.
    pub fn internal(reason: impl Into<String>) -> Self {
        CaptureError::Internal {
            reason: reason.into(),
        }
    }
}
