//! # Trip Store
//!
//! Owns the trip collection and the focused trip.
//!
//! Mutations are applied once the backend acknowledges them. Several
//! operations may be in flight at once; each one merges into whatever state
//! is current when it resolves, so the last one to land wins for any field
//! both touched.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::watch;

use super::commit;
use crate::backend::TripBackend;
use crate::core::trips::{self, NewTrip, Trip, TripAction, TripError, TripPatch, TripState};

pub struct TripStore {
    backend: Arc<dyn TripBackend>,
    state: watch::Sender<Arc<TripState>>,
}

impl TripStore {
    pub fn new(backend: Arc<dyn TripBackend>) -> Self {
        let (state, _) = watch::channel(Arc::new(TripState::default()));
        Self { backend, state }
    }

    pub fn snapshot(&self) -> Arc<TripState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TripState>> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: TripAction) -> Result<Arc<TripState>, TripError> {
        commit(&self.state, action, trips::update)
    }

    /// Replaces the whole collection with the backend's list.
    pub async fn fetch_trips(&self) -> Result<(), TripError> {
        self.dispatch(TripAction::FetchStarted)?;
        let fetched = match self.backend.list().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Fetching trips from {} failed: {e}", self.backend.name());
                self.dispatch(TripAction::FetchFailed)?;
                return Err(e.into());
            }
        };

        let count = fetched.len();
        match self.dispatch(TripAction::FetchSucceeded(fetched)) {
            Ok(_) => {
                info!("Loaded {count} trips");
                Ok(())
            }
            Err(e) => {
                warn!("Discarding fetched trips: {e}");
                self.dispatch(TripAction::FetchFailed)?;
                Err(e)
            }
        }
    }

    /// Creates a trip and appends it to the end of the collection.
    pub async fn create_trip(&self, fields: NewTrip) -> Result<Trip, TripError> {
        let trip = self.backend.create(fields).await?;
        self.dispatch(TripAction::Added(trip.clone()))?;
        info!("Created trip {} ({})", trip.id, trip.title);
        Ok(trip)
    }

    /// Merges `patch` over the trip with `id` and returns the merged record.
    pub async fn update_trip(&self, id: &str, patch: TripPatch) -> Result<Trip, TripError> {
        self.ensure_present(id)?;
        self.backend.update(id, &patch).await?;

        // The trip may have been deleted while the backend call was in flight.
        let state = self.dispatch(TripAction::Updated {
            id: id.to_string(),
            patch,
        })?;
        debug!("Updated trip {id}");
        state
            .find(id)
            .cloned()
            .ok_or_else(|| TripError::NotFound(id.to_string()))
    }

    pub async fn delete_trip(&self, id: &str) -> Result<(), TripError> {
        self.ensure_present(id)?;
        self.backend.delete(id).await?;
        self.dispatch(TripAction::Deleted(id.to_string()))?;
        info!("Deleted trip {id}");
        Ok(())
    }

    /// Focuses `trip` (or nothing). The trip is not checked against the collection.
    pub fn select_current(&self, trip: Option<Trip>) {
        if let Err(e) = self.dispatch(TripAction::Selected(trip)) {
            warn!("Selecting trip failed: {e}");
        }
    }

    /// Focuses the collection's trip with `id`.
    pub fn select_by_id(&self, id: &str) -> Result<Trip, TripError> {
        let trip = self
            .snapshot()
            .find(id)
            .cloned()
            .ok_or_else(|| TripError::NotFound(id.to_string()))?;
        self.dispatch(TripAction::Selected(Some(trip.clone())))?;
        Ok(trip)
    }

    fn ensure_present(&self, id: &str) -> Result<(), TripError> {
        if self.snapshot().contains(id) {
            Ok(())
        } else {
            debug!("Trip {id} not in collection");
            Err(TripError::NotFound(id.to_string()))
        }
    }
}
