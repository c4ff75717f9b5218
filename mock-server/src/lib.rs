use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
}

#[derive(Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
}

#[derive(Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserOut {
    pub id: i64,
    pub name: String,
    pub email: String,
}

struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
}

struct SessionRecord {
    user_id: i64,
    expires_at: Instant,
}

#[derive(Default)]
pub struct Store {
    books: BTreeMap<i64, Book>,
    last_book_id: i64,
    users: Vec<UserRecord>,
    sessions: HashMap<String, SessionRecord>,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    session_ttl: Duration,
}

/// Every failure is returned as `{"detail": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Session expired or invalid")]
    SessionInvalid,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Book not found")]
    BookNotFound,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    Malformed(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotLoggedIn
            | ServerError::SessionInvalid
            | ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::EmailTaken => StatusCode::CONFLICT,
            ServerError::BookNotFound => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) | ServerError::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Unreadable bodies and ids answer 400 with a `detail` like every other error.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub fn app() -> Router {
    app_with_session_ttl(SESSION_TTL)
}

pub fn app_with_session_ttl(session_ttl: Duration) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        session_ttl,
    };
    Router::new()
        .route("/health", get(health))
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Resolve the session cookie to a user id, dropping the session if it has
/// expired.
async fn require_session(state: &AppState, jar: &CookieJar) -> Result<i64, ServerError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .ok_or(ServerError::NotLoggedIn)?;
    let mut store = state.store.write().await;
    let (user_id, expires_at) = store
        .sessions
        .get(token)
        .map(|s| (s.user_id, s.expires_at))
        .ok_or(ServerError::SessionInvalid)?;
    if Instant::now() >= expires_at {
        store.sessions.remove(token);
        tracing::debug!("expired session dropped");
        return Err(ServerError::SessionInvalid);
    }
    Ok(user_id)
}

fn session_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(seconds))
        .build()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// -- books --

async fn list_books(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>, ServerError> {
    require_session(&state, &jar).await?;
    let store = state.store.read().await;
    let needle = params
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let books = store
        .books
        .values()
        .filter(|b| match &needle {
            Some(q) => b.title.to_lowercase().contains(q) || b.author.to_lowercase().contains(q),
            None => true,
        })
        .cloned()
        .collect();
    Ok(Json(books))
}

async fn create_book(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ServerError> {
    require_session(&state, &jar).await?;
    let Json(input) = body?;
    if is_blank(&input.title) || is_blank(&input.author) {
        return Err(ServerError::BadRequest("title and author are required"));
    }
    let mut store = state.store.write().await;
    store.last_book_id += 1;
    let book = Book {
        id: store.last_book_id,
        title: input.title,
        author: input.author,
    };
    store.books.insert(book.id, book.clone());
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(state): State<AppState>,
    jar: CookieJar,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ServerError> {
    require_session(&state, &jar).await?;
    let Path(id) = id?;
    let store = state.store.read().await;
    store
        .books
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::BookNotFound)
}

async fn update_book(
    State(state): State<AppState>,
    jar: CookieJar,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<Book>, ServerError> {
    require_session(&state, &jar).await?;
    let Path(id) = id?;
    let Json(input) = body?;
    let mut store = state.store.write().await;
    let book = store.books.get_mut(&id).ok_or(ServerError::BookNotFound)?;
    if input.title.as_deref().is_some_and(is_blank) || input.author.as_deref().is_some_and(is_blank) {
        return Err(ServerError::BadRequest("title and author must not be empty"));
    }
    if let Some(title) = input.title {
        book.title = title;
    }
    if let Some(author) = input.author {
        book.author = author;
    }
    Ok(Json(book.clone()))
}

async fn delete_book(
    State(state): State<AppState>,
    jar: CookieJar,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    require_session(&state, &jar).await?;
    let Path(id) = id?;
    let mut store = state.store.write().await;
    store
        .books
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ServerError::BookNotFound)
}

// -- auth --

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserOut>), ServerError> {
    let Json(input) = body?;
    if is_blank(&input.name) {
        return Err(ServerError::BadRequest("name is required"));
    }
    if !input.email.contains('@') {
        return Err(ServerError::BadRequest("a valid email is required"));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::BadRequest("password must be at least 4 characters"));
    }
    let mut store = state.store.write().await;
    if store.users.iter().any(|u| u.email == input.email) {
        return Err(ServerError::EmailTaken);
    }
    let user = UserRecord {
        id: store.users.len() as i64 + 1,
        name: input.name,
        email: input.email,
        password_hash: hash_password(&input.password),
    };
    let out = UserOut {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    };
    store.users.push(user);
    tracing::info!(user_id = out.id, "user registered");
    Ok((StatusCode::CREATED, Json(out)))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), ServerError> {
    let Json(input) = body?;
    let mut store = state.store.write().await;
    let user_id = store
        .users
        .iter()
        .find(|u| u.email == input.email && u.password_hash == hash_password(&input.password))
        .map(|u| u.id)
        .ok_or(ServerError::InvalidCredentials)?;

    let token = Uuid::new_v4().simple().to_string();
    store.sessions.insert(
        token.clone(),
        SessionRecord {
            user_id,
            expires_at: Instant::now() + state.session_ttl,
        },
    );
    tracing::info!(user_id, "session created");
    let jar = jar.add(session_cookie(token, state.session_ttl));
    Ok((jar, Json(json!({ "message": "logged in", "user_id": user_id }))))
}

async fn me(State(state): State<AppState>, jar: CookieJar) -> Result<Json<Value>, ServerError> {
    let user_id = require_session(&state, &jar).await?;
    Ok(Json(json!({ "logged_in": true, "user_id": user_id })))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    if let Some(token) = jar.get(SESSION_COOKIE).map(Cookie::value) {
        state.store.write().await.sessions.remove(token);
    }
    let jar = jar.add(session_cookie(String::new(), Duration::ZERO));
    (jar, Json(json!({ "message": "logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_serializes_to_json() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json, json!({"id": 1, "title": "Dune", "author": "Herbert"}));
    }

    #[test]
    fn create_book_rejects_missing_author() {
        let result: Result<CreateBook, _> = serde_json::from_str(r#"{"title":"Dune"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_book_all_fields_optional() {
        let input: UpdateBook = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.author.is_none());
    }

    #[test]
    fn password_hash_is_hex_sha256() {
        assert_eq!(
            hash_password("pw"),
            "30c952fab122c3f9759f02a6d95c3758b246b4fee239957b2d4fee46e26170c4"
        );
    }

    #[test]
    fn error_statuses() {
        assert_eq!(ServerError::NotLoggedIn.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServerError::EmailTaken.status(), StatusCode::CONFLICT);
        assert_eq!(ServerError::BookNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::BadRequest("x").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), SESSION_TTL);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(30)));
    }
}
