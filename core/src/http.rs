//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network. The host executes the actual I/O through a
//! [`Transport`] implementation and owns the cookie jar, the same way a
//! browser attaches credentials to `fetch` calls.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded,
//! replayed, and compared in tests without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL without a query string. Query parameters are
/// kept unencoded in `query`; the transport is responsible for encoding them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response (connection refused, DNS, TLS...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes requests on behalf of the core.
///
/// Implementations must keep cookies set by earlier responses and send them
/// with later requests to the same origin; session state lives entirely in
/// the server's cookie session.
pub trait Transport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Run one round trip, logging the request line and resulting status.
pub(crate) fn send<T: Transport + ?Sized>(
    transport: &mut T,
    request: HttpRequest,
) -> Result<HttpResponse, TransportError> {
    let method = request.method;
    let path = request.path.clone();
    tracing::debug!(%method, %path, "sending request");
    match transport.execute(request) {
        Ok(response) => {
            tracing::debug!(%method, %path, status = response.status, "response received");
            Ok(response)
        }
        Err(err) => {
            tracing::debug!(%method, %path, error = %err, "transport failed");
            Err(err)
        }
    }
}
