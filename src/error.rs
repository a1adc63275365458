//! Error types for the REST client and the quiz session.

use thiserror::Error;

/// Errors returned by the Ficous REST backend client.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The backend rejected the bearer token (HTTP 401/403).
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Failures surfaced by a quiz session. Both are recovered only by user action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QuizError {
    #[error("could not load exercise: {0}")]
    Load(#[source] ApiError),

    #[error("could not grade exercise: {0}")]
    Grade(#[source] ApiError),
}

/// Reasons an answer is refused by the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("no item with id {0}")]
    UnknownItem(String),

    #[error("answer does not match kind {kind} of item {item_id}")]
    KindMismatch { item_id: String, kind: String },

    #[error("option {index} out of range for item {item_id} ({count} options)")]
    OptionOutOfRange {
        item_id: String,
        index: u32,
        count: usize,
    },
}
