//! Session store: the client's view of the server-held cookie session.
//!
//! # Design
//! The store never trusts cached state. It starts out anonymous and is
//! re-derived by a probe of `GET /auth/me` every time the application loads.
//! Each state change reports a [`Transition`] so the owner can refresh or
//! clear data that depends on being logged in.

use crate::client::BookClient;
use crate::error::ApiError;
use crate::http::{send, Transport};
use crate::types::{Credentials, Registration, User, UserId};
use crate::validate::{validate_credentials, validate_registration};

/// Client-visible authentication state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { user_id: UserId },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user_id } => Some(*user_id),
        }
    }
}

/// What changed when the session was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entered `Authenticated`, or switched to a different user.
    LoggedIn(UserId),
    /// Left `Authenticated`.
    LoggedOut,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Session {
        self.session
    }

    fn set(&mut self, next: Session) -> Transition {
        let previous = std::mem::replace(&mut self.session, next);
        match (previous, next) {
            (a, b) if a == b => Transition::Unchanged,
            (_, Session::Authenticated { user_id }) => {
                tracing::info!(user_id, "session authenticated");
                Transition::LoggedIn(user_id)
            }
            (_, Session::Anonymous) => {
                tracing::info!("session ended");
                Transition::LoggedOut
            }
        }
    }

    /// Ask the server whether the session cookie is still valid. Any failure
    /// means anonymous; the error is returned alongside for reporting.
    pub fn probe<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
    ) -> (Transition, Option<ApiError>) {
        let result = send(transport, client.build_probe_session())
            .map_err(ApiError::from)
            .and_then(|response| client.parse_probe_session(response));
        match result {
            Ok(user_id) => (self.set(Session::Authenticated { user_id }), None),
            Err(err) => {
                tracing::debug!(error = %err, "no valid session");
                (self.set(Session::Anonymous), Some(err))
            }
        }
    }

    /// Validate, then log in. On failure the session is left untouched.
    pub fn login<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        credentials: &Credentials,
    ) -> Result<Transition, ApiError> {
        validate_credentials(credentials)?;
        let response = send(transport, client.build_login(credentials)?)?;
        let user_id = client.parse_login(response)?;
        Ok(self.set(Session::Authenticated { user_id }))
    }

    /// Always ends up anonymous. The server call's outcome is returned
    /// separately so a failed request can still be reported.
    pub fn logout<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
    ) -> (Transition, Result<(), ApiError>) {
        let result = send(transport, client.build_logout())
            .map_err(ApiError::from)
            .and_then(|response| client.parse_logout(response));
        (self.set(Session::Anonymous), result)
    }

    /// Create an account. Registration does not log the new user in.
    pub fn register<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        registration: &Registration,
    ) -> Result<User, ApiError> {
        validate_registration(registration)?;
        let response = send(transport, client.build_register(registration)?)?;
        let user = client.parse_register(response)?;
        tracing::info!(user_id = user.id, "account registered");
        Ok(user)
    }

    /// Drop to anonymous without contacting the server.
    pub fn reset(&mut self) -> Transition {
        self.set(Session::Anonymous)
    }
}
