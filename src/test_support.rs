//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::backend::mock::TripLatency;
use crate::backend::{
    AuthBackend, AuthGrant, BackendError, MockAuthBackend, MockTripBackend, TripBackend,
};
use crate::core::session::User;
use crate::core::storage::TokenStorage;
use crate::core::trips::{NewTrip, Trip, TripPatch, TripStatus};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_user() -> User {
    User {
        id: "u-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        avatar: None,
    }
}

/// A one-week March trip in the planning stage.
pub fn sample_trip(id: &str) -> Trip {
    Trip {
        id: id.to_string(),
        title: format!("Trip {id}"),
        destination: "Lisbon, Portugal".to_string(),
        start_date: date(2024, 3, 15),
        end_date: date(2024, 3, 22),
        budget: 2500,
        status: TripStatus::Planning,
    }
}

pub fn new_trip(title: &str) -> NewTrip {
    NewTrip {
        title: title.to_string(),
        destination: "Y".to_string(),
        start_date: date(2024, 7, 1),
        end_date: date(2024, 7, 8),
        budget: 100,
        status: TripStatus::Planning,
    }
}

/// Mock auth backend with no simulated latency.
pub fn instant_auth() -> Arc<dyn AuthBackend> {
    Arc::new(MockAuthBackend::new(Duration::ZERO))
}

/// Mock trip backend with no simulated latency.
pub fn instant_trips() -> Arc<dyn TripBackend> {
    Arc::new(MockTripBackend::new(TripLatency::uniform(Duration::ZERO)))
}

/// Refuses every credential and token.
pub struct RejectingAuthBackend;

#[async_trait]
impl AuthBackend for RejectingAuthBackend {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn authenticate(&self, _email: &str, _password: &str) -> Result<AuthGrant, BackendError> {
        Err(BackendError::Rejected("invalid credentials".to_string()))
    }

    async fn register(
        &self,
        _name: &str,
        _email: &str,
        _password: &str,
    ) -> Result<AuthGrant, BackendError> {
        Err(BackendError::Rejected("email already registered".to_string()))
    }

    async fn validate(&self, _token: &str) -> Result<User, BackendError> {
        Err(BackendError::Rejected("expired".to_string()))
    }
}

/// A trip backend that is always down.
pub struct UnavailableTripBackend;

#[async_trait]
impl TripBackend for UnavailableTripBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn list(&self) -> Result<Vec<Trip>, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    async fn create(&self, _fields: NewTrip) -> Result<Trip, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    async fn update(&self, _id: &str, _patch: &TripPatch) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }
}

/// Token storage that can be read and cleared but refuses every write.
#[derive(Default)]
pub struct FullDiskTokenStorage {
    token: Mutex<Option<String>>,
}

impl FullDiskTokenStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStorage for FullDiskTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn save(&self, _token: &str) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
