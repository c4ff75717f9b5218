//! Application state: session, book list, current route and notice.
//!
//! # Design
//! `App` owns everything a front-end needs and is handed to views explicitly.
//! Its lifecycle is explicit: [`App::init`] probes the server session and,
//! only once the probe has settled, loads the books; [`App::teardown`] drops
//! all client state and returns the transport.
//!
//! Every session transition is funnelled through one place so the book list
//! can never outlive the session: entering `Authenticated` refreshes it,
//! leaving it clears it.
//!
//! Each user action clears the previous notice. A failure is recorded as the
//! new notice and also returned, and never leaves the app unusable.

use crate::books::BookList;
use crate::client::BookClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::router::{guard, Route, View};
use crate::session::{Session, SessionStore, Transition};
use crate::types::{Book, BookId, BookInput, BookPatch, Credentials, Registration, User, UserId};

/// User-visible message describing the last failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

pub struct App<T: Transport> {
    client: BookClient,
    transport: T,
    session: SessionStore,
    books: BookList,
    route: Route,
    notice: Option<Notice>,
}

impl<T: Transport> App<T> {
    /// Build the app and sync it with the server: probe the session first,
    /// then load the books if the probe found one.
    pub fn init(client: BookClient, transport: T) -> Self {
        let mut app = Self {
            client,
            transport,
            session: SessionStore::new(),
            books: BookList::new(),
            route: Route::Home,
            notice: None,
        };
        app.sync();
        app
    }

    /// Drop session and book state and hand the transport back.
    pub fn teardown(mut self) -> T {
        self.session.reset();
        self.books.clear();
        tracing::debug!("app torn down");
        self.transport
    }

    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.session().user_id()
    }

    pub fn books(&self) -> &[Book] {
        self.books.as_slice()
    }

    pub fn find_book(&self, id: BookId) -> Option<&Book> {
        self.books.find(id)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The guarded view for the current route.
    pub fn view(&self) -> View {
        guard(&self.route, &self.session())
    }

    pub fn navigate(&mut self, path: &str) -> View {
        self.notice = None;
        self.route = Route::parse(path);
        tracing::debug!(route = %self.route, "navigated");
        self.view()
    }

    // -- session actions --

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserId, ApiError> {
        self.notice = None;
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .session
            .login(&self.client, &mut self.transport, &credentials);
        let transition = self.record(result)?;
        self.route = Route::Home;
        self.apply(transition);
        self.user_id().ok_or(ApiError::LoginRequired)
    }

    /// Always ends anonymous with an empty list. A failed server call is
    /// still reported through the notice and the return value.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.notice = None;
        let (transition, result) = self.session.logout(&self.client, &mut self.transport);
        self.apply(transition);
        self.record(result)
    }

    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<User, ApiError> {
        self.notice = None;
        let registration = Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .session
            .register(&self.client, &mut self.transport, &registration);
        self.record(result)
    }

    /// Re-run the startup probe, e.g. when a request came back 401.
    pub fn resync(&mut self) -> Session {
        self.notice = None;
        self.sync();
        self.session()
    }

    // -- book actions --

    pub fn refresh(&mut self) -> Result<(), ApiError> {
        self.load(None)
    }

    pub fn search(&mut self, query: &str) -> Result<(), ApiError> {
        self.load(Some(query))
    }

    pub fn get(&mut self, id: BookId) -> Result<Book, ApiError> {
        self.notice = None;
        self.require_login()?;
        let result = self.books.get(&self.client, &mut self.transport, id);
        self.record(result)
    }

    pub fn add(&mut self, input: &BookInput) -> Result<Book, ApiError> {
        self.notice = None;
        self.require_login()?;
        let result = self.books.add(&self.client, &mut self.transport, input);
        let book = self.record(result)?;
        self.route = Route::Home;
        Ok(book)
    }

    pub fn update(&mut self, id: BookId, patch: &BookPatch) -> Result<Book, ApiError> {
        self.notice = None;
        self.require_login()?;
        let result = self.books.update(&self.client, &mut self.transport, id, patch);
        let book = self.record(result)?;
        self.route = Route::Home;
        Ok(book)
    }

    pub fn remove(&mut self, id: BookId) -> Result<(), ApiError> {
        self.notice = None;
        self.require_login()?;
        let result = self.books.remove(&self.client, &mut self.transport, id);
        self.record(result)?;
        self.route = Route::Home;
        Ok(())
    }

    // -- internals --

    /// Probe the session and apply the outcome. A 401 just means anonymous;
    /// any other probe failure is reported.
    fn sync(&mut self) {
        let (transition, err) = self.session.probe(&self.client, &mut self.transport);
        if let Some(err) = err.filter(|e| !e.is_unauthorized()) {
            self.report(&err);
        }
        self.apply(transition);
    }

    fn load(&mut self, search: Option<&str>) -> Result<(), ApiError> {
        self.notice = None;
        self.require_login()?;
        let result = self.books.refresh(&self.client, &mut self.transport, search);
        self.record(result)
    }

    fn require_login(&mut self) -> Result<(), ApiError> {
        if self.session().is_authenticated() {
            Ok(())
        } else {
            self.record(Err(ApiError::LoginRequired))
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::LoggedIn(_) => {
                let result = self.books.refresh(&self.client, &mut self.transport, None);
                if let Err(err) = result {
                    self.report(&err);
                }
            }
            Transition::LoggedOut => self.books.clear(),
            Transition::Unchanged => {}
        }
    }

    fn record<R>(&mut self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    fn report(&mut self, err: &ApiError) {
        tracing::warn!(error = %err, "action failed");
        self.notice = Some(Notice::from(err));
    }
}
