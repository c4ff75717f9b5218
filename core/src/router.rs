//! Path routing and the login guard.
//!
//! Routing is a pure mapping from a URL path to a [`Route`]; the guard then
//! decides, given the current session, whether the page itself or the
//! "login required" placeholder is shown.

use std::fmt;

use crate::session::Session;
use crate::types::BookId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: the book list.
    Home,
    Login,
    Create,
    Update(BookId),
    Delete(BookId),
    /// Any path that matches nothing else; keeps the original path.
    NotFound(String),
}

impl Route {
    /// Map a path to a route. Query strings, fragments and empty segments
    /// are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["create"] => Route::Create,
            ["update", id] => id
                .parse()
                .map(Route::Update)
                .unwrap_or_else(|_| Route::NotFound(path.to_string())),
            ["delete", id] => id
                .parse()
                .map(Route::Delete)
                .unwrap_or_else(|_| Route::NotFound(path.to_string())),
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Create => "/create".to_string(),
            Route::Update(id) => format!("/update/{id}"),
            Route::Delete(id) => format!("/delete/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Create | Route::Update(_) | Route::Delete(_)
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What the UI should render for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    LoginRequired,
    Page(Route),
}

pub fn guard(route: &Route, session: &Session) -> View {
    if route.requires_auth() && !session.is_authenticated() {
        View::LoginRequired
    } else {
        View::Page(route.clone())
    }
}
