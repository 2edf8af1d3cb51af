use std::fmt;

use async_trait::async_trait;

use crate::core::session::User;
use crate::core::trips::{NewTrip, Trip, TripPatch};

/// Errors a backend collaborator can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend understood the request and refused it (bad credentials, expired token).
    Rejected(String),
    /// The backend could not be reached or failed internally.
    Unavailable(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Rejected(msg) => write!(f, "rejected: {msg}"),
            BackendError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// What a successful credential exchange hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub user: User,
    pub token: String,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Exchanges credentials for an identity and bearer token.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthGrant, BackendError>;

    /// Creates a fresh identity and signs it in.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, BackendError>;

    /// Checks a previously issued token and returns the identity it belongs to.
    async fn validate(&self, token: &str) -> Result<User, BackendError>;
}

#[async_trait]
pub trait TripBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn list(&self) -> Result<Vec<Trip>, BackendError>;

    /// Persists a new trip. The backend assigns the id.
    async fn create(&self, fields: NewTrip) -> Result<Trip, BackendError>;

    async fn update(&self, id: &str, patch: &TripPatch) -> Result<(), BackendError>;

    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}
