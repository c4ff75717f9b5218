//! Stateless HTTP request builder and response parser for the book API.
//!
//! # Design
//! `BookClient` holds only a `base_url` and carries no mutable state between
//! calls. Each REST operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the client
//! deterministic and free of I/O dependencies. Session cookies are attached
//! by the transport, never by the client.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Book, BookId, BookInput, BookPatch, Credentials, ErrorBody, Registration, SessionBody, User,
    UserId,
};

/// Query parameter carrying the title/author search string.
pub const SEARCH_PARAM: &str = "q";

/// Synchronous, stateless client for the book API.
#[derive(Debug, Clone)]
pub struct BookClient {
    base_url: String,
}

impl BookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    // -- books --

    /// `GET /books`, optionally filtered by a title/author substring.
    /// A blank search string lists everything.
    pub fn build_list_books(&self, search: Option<&str>) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/books");
        if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
            req.query.push((SEARCH_PARAM.to_string(), q.to_string()));
        }
        req
    }

    pub fn build_get_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/books/{id}"))
    }

    pub fn build_create_book(&self, input: &BookInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/books", input)
    }

    pub fn build_update_book(&self, id: BookId, patch: &BookPatch) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/books/{id}"), patch)
    }

    pub fn build_delete_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/books/{id}"))
    }

    pub fn parse_list_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        decode(response)
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        decode(response)
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        decode(response)
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        decode(response)
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- auth --

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", credentials)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/auth/logout")
    }

    /// `GET /auth/me`: checks whether the current session cookie is valid.
    pub fn build_probe_session(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/auth/me")
    }

    pub fn build_register(&self, registration: &Registration) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/register", registration)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<UserId, ApiError> {
        decode::<SessionBody>(response).map(|body| body.user_id)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_probe_session(&self, response: HttpResponse) -> Result<UserId, ApiError> {
        decode::<SessionBody>(response).map(|body| body.user_id)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = error_detail(response);
    if response.status == 404 {
        return Err(ApiError::NotFound(detail));
    }
    Err(ApiError::Request {
        status: response.status,
        detail,
    })
}

/// The server's `detail` string, or a generic message when the body does
/// not carry one.
fn error_detail(response: &HttpResponse) -> String {
    serde_json::from_str::<ErrorBody>(&response.body)
        .map(|body| body.detail)
        .unwrap_or_else(|_| format!("request failed with status {}", response.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BookClient {
        BookClient::new("http://localhost:8000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_books_produces_correct_request() {
        let req = client().build_list_books(None);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/books");
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_books_with_search() {
        let req = client().build_list_books(Some(" dune "));
        assert_eq!(req.path, "http://localhost:8000/books");
        assert_eq!(req.query, vec![("q".to_string(), "dune".to_string())]);
    }

    #[test]
    fn blank_search_is_dropped() {
        let req = client().build_list_books(Some("   "));
        assert!(req.query.is_empty());
    }

    #[test]
    fn build_get_book_produces_correct_request() {
        let req = client().build_get_book(7);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/books/7");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_book_produces_correct_request() {
        let req = client()
            .build_create_book(&BookInput::new("Dune", "Herbert"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/books");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["author"], "Herbert");
    }

    #[test]
    fn build_update_book_omits_missing_fields() {
        let req = client().build_update_book(3, &BookPatch::title("X")).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8000/books/3");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "X");
        assert!(body.get("author").is_none());
    }

    #[test]
    fn build_delete_book_produces_correct_request() {
        let req = client().build_delete_book(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8000/books/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_auth_requests() {
        let c = client();
        let login = c
            .build_login(&Credentials {
                email: "a@b.com".to_string(),
                password: "pw".to_string(),
            })
            .unwrap();
        assert_eq!(login.method, HttpMethod::Post);
        assert_eq!(login.path, "http://localhost:8000/auth/login");
        let body: serde_json::Value = serde_json::from_str(login.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "password": "pw"}));

        let logout = c.build_logout();
        assert_eq!(logout.method, HttpMethod::Post);
        assert_eq!(logout.path, "http://localhost:8000/auth/logout");
        assert!(logout.body.is_none());

        let probe = c.build_probe_session();
        assert_eq!(probe.method, HttpMethod::Get);
        assert_eq!(probe.path, "http://localhost:8000/auth/me");

        let register = c
            .build_register(&Registration {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();
        assert_eq!(register.path, "http://localhost:8000/auth/register");
        let body: serde_json::Value =
            serde_json::from_str(register.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[test]
    fn parse_list_books_success() {
        let books = client()
            .parse_list_books(response(200, r#"[{"id":1,"title":"Dune","author":"Herbert"}]"#))
            .unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[test]
    fn parse_get_book_not_found_keeps_detail() {
        let err = client()
            .parse_get_book(response(404, r#"{"detail":"Book not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref d) if d == "Book not found"));
        assert_eq!(err.to_string(), "Book not found");
    }

    #[test]
    fn parse_create_book_accepts_any_2xx() {
        let body = r#"{"id":1,"title":"New","author":"A"}"#;
        assert_eq!(client().parse_create_book(response(201, body)).unwrap().id, 1);
        assert_eq!(client().parse_create_book(response(200, body)).unwrap().id, 1);
    }

    #[test]
    fn parse_create_book_surfaces_detail() {
        let err = client()
            .parse_create_book(response(400, r#"{"detail":"title and author are required"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 400, .. }));
        assert_eq!(err.to_string(), "title and author are required");
    }

    #[test]
    fn error_without_detail_falls_back_to_generic_message() {
        let err = client()
            .parse_create_book(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 500, .. }));
        assert_eq!(err.to_string(), "request failed with status 500");
    }

    #[test]
    fn non_string_detail_falls_back_to_generic_message() {
        let err = client()
            .parse_update_book(response(422, r#"{"detail":[{"loc":["body"]}]}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "request failed with status 422");
    }

    #[test]
    fn parse_delete_book_success() {
        assert!(client().parse_delete_book(response(204, "")).is_ok());
    }

    #[test]
    fn parse_delete_book_not_found() {
        let err = client().parse_delete_book(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn parse_login_and_probe_read_user_id() {
        let c = client();
        let id = c
            .parse_login(response(200, r#"{"message":"logged in","user_id":1}"#))
            .unwrap();
        assert_eq!(id, 1);
        let id = c
            .parse_probe_session(response(200, r#"{"logged_in":true,"user_id":4}"#))
            .unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn parse_probe_session_unauthorized() {
        let err = client()
            .parse_probe_session(response(401, r#"{"detail":"Not logged in"}"#))
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BookClient::new("http://localhost:8000/");
        let req = client.build_list_books(None);
        assert_eq!(req.path, "http://localhost:8000/books");
    }

    #[test]
    fn parse_list_books_bad_json() {
        let err = client()
            .parse_list_books(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
