//! Client core for the book management service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and layers the
//! authentication-gated application state on top: a session store, a book
//! list store, and a path router with a login guard.
//!
//! # Design
//! - `BookClient` is stateless; it holds only `base_url`.
//! - Each REST operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `App` is the single owner of session and book state and drives a
//!   host-supplied [`Transport`]. The host keeps the cookie jar.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod app;
pub mod books;
pub mod client;
pub mod error;
pub mod http;
pub mod router;
pub mod session;
pub mod types;
pub mod validate;

#[cfg(test)]
mod testing;

pub use app::{App, Notice};
pub use books::BookList;
pub use client::BookClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use router::{guard, Route, View};
pub use session::{Session, SessionStore, Transition};
pub use types::{Book, BookId, BookInput, BookPatch, Credentials, Registration, User, UserId};
pub use validate::{BlogPost, FieldError, ValidationErrors};
