//! Error types for the book management client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the book does not exist" from other failures. Every other non-2xx
//! response lands in `Request` with the status and the server's `detail`.
//! The `Display` output of request errors is the server detail verbatim so it
//! can be shown to the user as-is.

use crate::http::TransportError;
use crate::validate::ValidationErrors;

/// Errors returned by `BookClient` parse methods and `App` actions.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// User input was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The action needs an authenticated session and none is active.
    #[error("Please login to access this page.")]
    LoginRequired,

    /// The server returned 404.
    #[error("{0}")]
    NotFound(String),

    /// The server returned a non-2xx status other than 404.
    #[error("{detail}")]
    Request { status: u16, detail: String },

    /// The request never completed.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// HTTP status for errors that came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
