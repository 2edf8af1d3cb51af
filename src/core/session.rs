//! # Session State
//!
//! Who is logged in, and the bearer token that proves it.
//!
//! ```text
//!   Anonymous ──LoginStarted──▶ Authenticating ──LoginSucceeded──▶ Authenticated
//!       ▲                             │                                 │
//!       └──────────LoginFailed────────┘                                 │
//!       └──────────────────────────LoggedOut────────────────────────────┘
//! ```
//!
//! `update()` is the only way a `Session` changes. It never does I/O;
//! the store in `crate::store::session_store` performs the backend call and
//! storage writes, then commits the resulting action here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

/// The identity record of an authenticated user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Coarse lifecycle phase, derived from a `Session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Authentication state snapshot.
///
/// `is_authenticated()` is computed from `user` and `token`, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoginStarted,
    LoginSucceeded { user: User, token: String },
    LoginFailed,
    LoggedOut,
    UserUpdated(User),
}

#[derive(Debug)]
pub enum SessionError {
    /// The auth backend rejected or could not process the request.
    Auth(BackendError),
    /// `UserUpdated` was dispatched without an authenticated session.
    NotAuthenticated,
    /// The token could not be written to durable storage.
    Storage(std::io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Auth(e) => write!(f, "authentication failed: {e}"),
            SessionError::NotAuthenticated => write!(f, "no authenticated session"),
            SessionError::Storage(e) => write!(f, "token storage error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<BackendError> for SessionError {
    fn from(e: BackendError) -> Self {
        SessionError::Auth(e)
    }
}

/// Applies `action` to `session`, returning the next snapshot.
pub fn update(session: &Session, action: SessionAction) -> Result<Session, SessionError> {
    let next = match action {
        SessionAction::LoginStarted => Session {
            is_loading: true,
            ..session.clone()
        },
        SessionAction::LoginSucceeded { user, token } => Session {
            user: Some(user),
            token: Some(token),
            is_loading: false,
        },
        // Failure and logout land in the same place: nothing known about anyone.
        SessionAction::LoginFailed | SessionAction::LoggedOut => Session::default(),
        SessionAction::UserUpdated(user) => {
            if !session.is_authenticated() {
                return Err(SessionError::NotAuthenticated);
            }
            Session {
                user: Some(user),
                ..session.clone()
            }
        }
    };
    Ok(next)
}
