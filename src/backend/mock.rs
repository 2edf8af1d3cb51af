//! In-process stand-ins for the auth and trip backends.
//!
//! Every call sleeps for a configurable latency and then succeeds. Trip
//! mutations are acknowledged without being recorded anywhere: the
//! collection lives only in `TripStore`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;

use super::provider::{AuthBackend, AuthGrant, BackendError, TripBackend};
use crate::core::session::User;
use crate::core::trips::{NewTrip, Trip, TripPatch, TripStatus};

pub const DEFAULT_AUTH_LATENCY: Duration = Duration::from_millis(1000);
pub const DEFAULT_LIST_LATENCY: Duration = Duration::from_millis(800);
pub const DEFAULT_CREATE_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_UPDATE_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_DELETE_LATENCY: Duration = Duration::from_millis(300);

const TOKEN_PREFIX: &str = "mock-jwt-token-";

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

fn issue_token() -> String {
    format!("{TOKEN_PREFIX}{}", Utc::now().timestamp_millis())
}

/// Display name from the local part of an email, `"User"` if there is none.
fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("User")
        .to_string()
}

// ============================================================================
// Auth
// ============================================================================

pub struct MockAuthBackend {
    latency: Duration,
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_LATENCY)
    }
}

impl MockAuthBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    fn name(&self) -> &str {
        "mock-auth"
    }

    async fn authenticate(&self, email: &str, _password: &str) -> Result<AuthGrant, BackendError> {
        simulate(self.latency).await;
        debug!("mock auth: accepting credentials for {email}");
        Ok(AuthGrant {
            user: User {
                id: "1".to_string(),
                name: name_from_email(email),
                email: email.to_string(),
                avatar: None,
            },
            token: issue_token(),
        })
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<AuthGrant, BackendError> {
        simulate(self.latency).await;
        debug!("mock auth: registering {email}");
        Ok(AuthGrant {
            user: User {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                avatar: None,
            },
            token: issue_token(),
        })
    }

    async fn validate(&self, token: &str) -> Result<User, BackendError> {
        simulate(self.latency).await;
        if !token.starts_with(TOKEN_PREFIX) {
            return Err(BackendError::Rejected("unrecognized token".to_string()));
        }
        // No user directory behind the mock, so any well-formed token maps to the demo account.
        Ok(User {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            avatar: None,
        })
    }
}

// ============================================================================
// Trips
// ============================================================================

/// Per-operation latencies for `MockTripBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLatency {
    pub list: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for TripLatency {
    fn default() -> Self {
        Self {
            list: DEFAULT_LIST_LATENCY,
            create: DEFAULT_CREATE_LATENCY,
            update: DEFAULT_UPDATE_LATENCY,
            delete: DEFAULT_DELETE_LATENCY,
        }
    }
}

impl TripLatency {
    /// Same latency for every operation.
    pub fn uniform(latency: Duration) -> Self {
        Self {
            list: latency,
            create: latency,
            update: latency,
            delete: latency,
        }
    }
}

#[derive(Default)]
pub struct MockTripBackend {
    latency: TripLatency,
}

impl MockTripBackend {
    pub fn new(latency: TripLatency) -> Self {
        Self { latency }
    }
}

type Ymd = (i32, u32, u32);

fn seed(
    id: &str,
    title: &str,
    destination: &str,
    start: Ymd,
    end: Ymd,
    budget: u64,
    status: TripStatus,
) -> Option<Trip> {
    Some(Trip {
        id: id.to_string(),
        title: title.to_string(),
        destination: destination.to_string(),
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
        budget,
        status,
    })
}

/// The fixed collection served by `MockTripBackend::list`.
pub fn seed_trips() -> Vec<Trip> {
    [
        seed("1", "Tokyo Adventure", "Tokyo, Japan", (2024, 3, 15), (2024, 3, 22), 2500, TripStatus::Planning),
        seed("2", "Paris Getaway", "Paris, France", (2024, 4, 10), (2024, 4, 17), 1800, TripStatus::Booked),
        seed("3", "New York City", "New York, USA", (2024, 5, 20), (2024, 5, 27), 2200, TripStatus::Planning),
        seed("4", "Bali Retreat", "Bali, Indonesia", (2024, 6, 15), (2024, 6, 25), 1500, TripStatus::Completed),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[async_trait]
impl TripBackend for MockTripBackend {
    fn name(&self) -> &str {
        "mock-trips"
    }

    async fn list(&self) -> Result<Vec<Trip>, BackendError> {
        simulate(self.latency.list).await;
        Ok(seed_trips())
    }

    async fn create(&self, fields: NewTrip) -> Result<Trip, BackendError> {
        simulate(self.latency.create).await;
        Ok(Trip::from_new(uuid::Uuid::new_v4().to_string(), fields))
    }

    async fn update(&self, id: &str, _patch: &TripPatch) -> Result<(), BackendError> {
        simulate(self.latency.update).await;
        debug!("mock trips: acknowledged update of {id}");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        simulate(self.latency.delete).await;
        debug!("mock trips: acknowledged delete of {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::new_trip;

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("ada@example.com"), "ada");
        assert_eq!(name_from_email("@example.com"), "User");
        assert_eq!(name_from_email(""), "User");
        assert_eq!(name_from_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_seed_trips_have_distinct_ids() {
        let trips = seed_trips();
        assert_eq!(trips.len(), 4);
        let ids: HashSet<_> = trips.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), trips.len());
        assert_eq!(trips[0].title, "Tokyo Adventure");
        assert_eq!(trips[3].status, TripStatus::Completed);
    }

    #[tokio::test]
    async fn test_authenticate_issues_prefixed_token() {
        let backend = MockAuthBackend::new(Duration::ZERO);
        let grant = backend.authenticate("ada@example.com", "pw").await.unwrap();
        assert!(grant.token.starts_with(TOKEN_PREFIX));
        assert_eq!(grant.user.name, "ada");
        assert_eq!(grant.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_register_uses_supplied_name() {
        let backend = MockAuthBackend::new(Duration::ZERO);
        let grant = backend.register("Ada Lovelace", "ada@example.com", "pw").await.unwrap();
        assert_eq!(grant.user.name, "Ada Lovelace");
        assert_ne!(grant.user.id, "1");
    }

    #[tokio::test]
    async fn test_validate_rejects_foreign_token() {
        let backend = MockAuthBackend::new(Duration::ZERO);
        assert!(backend.validate("mock-jwt-token-42").await.is_ok());
        assert!(matches!(
            backend.validate("garbage").await,
            Err(BackendError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let backend = MockTripBackend::new(TripLatency::uniform(Duration::ZERO));
        let a = backend.create(new_trip("X")).await.unwrap();
        let b = backend.create(new_trip("X")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "X");
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let backend = MockTripBackend::new(TripLatency::uniform(Duration::ZERO));
        assert_eq!(backend.list().await.unwrap(), backend.list().await.unwrap());
    }
}
