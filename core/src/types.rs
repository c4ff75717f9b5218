//! Domain DTOs for the book management API.
//!
//! # Design
//! These types mirror the server's JSON schema but are defined independently
//! of the mock-server crate. Integration tests catch any schema drift between
//! the two.

use serde::{Deserialize, Serialize};

/// Server-assigned book identifier.
pub type BookId = i64;

/// Server-assigned user identifier.
pub type UserId = i64;

/// A single book returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
}

/// Request payload for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: String,
}

impl BookInput {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Request payload for updating an existing book. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl BookPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none()
    }
}

impl From<BookInput> for BookPatch {
    fn from(input: BookInput) -> Self {
        Self {
            title: Some(input.title),
            author: Some(input.author),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Account identity returned by `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Body of a successful login or session probe. Both endpoints carry the
/// user id; the remaining fields differ and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionBody {
    pub user_id: UserId,
}

/// The `{detail}` envelope every error response carries.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
