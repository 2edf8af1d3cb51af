//! # Stores
//!
//! Long-lived owners of the session and trip state.
//!
//! Each store keeps its current snapshot in a `tokio::sync::watch` channel.
//! Async operations call their backend first, then commit an action through
//! the pure `update()` of the matching `core` module. Readers get either a
//! cheap `Arc` snapshot or a receiver that wakes on every committed change.

pub mod session_store;
pub mod trip_store;

pub use session_store::SessionStore;
pub use trip_store::TripStore;

use std::sync::Arc;

use tokio::sync::watch;

/// Runs `reduce` against the current snapshot and publishes the result.
///
/// The reducer runs under the channel's write lock, so two commits never
/// interleave. A rejected action leaves the snapshot as it was and wakes no one.
pub(crate) fn commit<S, A, E>(
    cell: &watch::Sender<Arc<S>>,
    action: A,
    reduce: fn(&S, A) -> Result<S, E>,
) -> Result<Arc<S>, E> {
    let mut outcome = None;
    cell.send_if_modified(|current| match reduce(&**current, action) {
        Ok(next) => {
            *current = Arc::new(next);
            outcome = Some(Ok(Arc::clone(current)));
            true
        }
        Err(e) => {
            outcome = Some(Err(e));
            false
        }
    });
    outcome.unwrap_or_else(|| Ok(cell.borrow().clone()))
}
