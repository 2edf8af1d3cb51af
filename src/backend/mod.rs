pub mod mock;
pub mod provider;

pub use mock::{MockAuthBackend, MockTripBackend, seed_trips};
pub use provider::{AuthBackend, AuthGrant, BackendError, TripBackend};
