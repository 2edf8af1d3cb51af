//! # Session Store
//!
//! Single source of truth for "who is logged in".
//!
//! Token persistence happens here, next to the backend call, and always
//! before the matching action is committed: a session is never reported as
//! authenticated with a token that failed to reach storage.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::watch;

use super::commit;
use crate::backend::{AuthBackend, AuthGrant, BackendError};
use crate::core::session::{self, Session, SessionAction, SessionError, User};
use crate::core::storage::TokenStorage;

pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<Arc<Session>>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(Arc::new(Session::default()));
        Self {
            backend,
            storage,
            state,
        }
    }

    pub fn snapshot(&self) -> Arc<Session> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: SessionAction) -> Result<Arc<Session>, SessionError> {
        commit(&self.state, action, session::update)
    }

    /// Resumes a session from a stored token.
    ///
    /// Returns `Ok(None)` when no token is stored. A stored token is checked
    /// with the auth backend; if the backend rejects it, the token is dropped
    /// from storage and the session stays anonymous.
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        let token = match self.storage.load().map_err(SessionError::Storage)? {
            Some(token) => token,
            None => {
                debug!("No stored token, starting anonymous");
                return Ok(None);
            }
        };

        self.dispatch(SessionAction::LoginStarted)?;
        match self.backend.validate(&token).await {
            Ok(user) => {
                info!("Restored session for {}", user.email);
                self.dispatch(SessionAction::LoginSucceeded {
                    user: user.clone(),
                    token,
                })?;
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Stored token rejected by {}: {e}", self.backend.name());
                self.forget_token();
                self.dispatch(SessionAction::LoginFailed)?;
                Err(SessionError::Auth(e))
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        info!("Logging in as {email}");
        self.dispatch(SessionAction::LoginStarted)?;
        let result = self.backend.authenticate(email, password).await;
        self.finish(result)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        info!("Registering {email}");
        self.dispatch(SessionAction::LoginStarted)?;
        let result = self.backend.register(name, email, password).await;
        self.finish(result)
    }

    /// Clears the stored token and returns to anonymous, whatever the current state.
    pub fn logout(&self) {
        self.forget_token();
        if let Err(e) = self.dispatch(SessionAction::LoggedOut) {
            warn!("Logout transition failed: {e}");
        }
        info!("Logged out");
    }

    /// Replaces the identity record. Only allowed while authenticated.
    pub fn update_user(&self, user: User) -> Result<(), SessionError> {
        self.dispatch(SessionAction::UserUpdated(user))?;
        debug!("User record updated");
        Ok(())
    }

    fn finish(&self, result: Result<AuthGrant, BackendError>) -> Result<User, SessionError> {
        let grant = match result {
            Ok(grant) => grant,
            Err(e) => {
                warn!("Authentication failed: {e}");
                self.forget_token();
                self.dispatch(SessionAction::LoginFailed)?;
                return Err(SessionError::Auth(e));
            }
        };

        if let Err(e) = self.storage.save(&grant.token) {
            warn!("Failed to persist session token: {e}");
            self.forget_token();
            self.dispatch(SessionAction::LoginFailed)?;
            return Err(SessionError::Storage(e));
        }

        let AuthGrant { user, token } = grant;
        info!("Authenticated as {}", user.email);
        self.dispatch(SessionAction::LoginSucceeded {
            user: user.clone(),
            token,
        })?;
        Ok(user)
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear stored token: {e}");
        }
    }
}
