//! # Trip Collection State
//!
//! The trip list plus the one trip currently in focus.
//!
//! ```text
//! TripState
//! ├── trips: Vec<Trip>              // insertion order, never sorted here
//! ├── current_trip: Option<Trip>    // focused trip, refreshed on update
//! └── in_flight_fetches: usize      // outstanding fetches (drives is_loading)
//! ```
//!
//! Invariants held by `update()`:
//! - ids in `trips` are pairwise distinct
//! - an update to the focused trip refreshes `current_trip`
//! - deleting the focused trip clears `current_trip`
//! - a fetch keeps the focus only if the new collection still has that id

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Planning,
    Booked,
    Ongoing,
    Completed,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TripStatus::Planning => "planning",
            TripStatus::Booked => "booked",
            TripStatus::Ongoing => "ongoing",
            TripStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Whole currency units.
    pub budget: u64,
    pub status: TripStatus,
}

impl Trip {
    /// Builds a trip from caller-supplied fields and a backend-assigned id.
    pub fn from_new(id: String, fields: NewTrip) -> Self {
        Self {
            id,
            title: fields.title,
            destination: fields.destination,
            start_date: fields.start_date,
            end_date: fields.end_date,
            budget: fields.budget,
            status: fields.status,
        }
    }

    /// Length of the trip in days. Zero or negative when the dates are inverted.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Budget per day, rounded to the nearest unit. `None` for zero-length trips.
    pub fn daily_budget(&self) -> Option<u64> {
        let days = self.duration_days();
        if days <= 0 {
            return None;
        }
        Some((self.budget as f64 / days as f64).round() as u64)
    }

    /// Days from `today` until departure (negative once the trip has started).
    pub fn days_until_start(&self, today: NaiveDate) -> i64 {
        (self.start_date - today).num_days()
    }
}

/// Fields for a trip that has not been assigned an id yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: u64,
    pub status: TripStatus,
}

/// Partial trip edit. Every `Some` field replaces the stored value wholesale.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TripStatus>,
}

impl TripPatch {
    pub fn status(status: TripStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TripPatch::default()
    }

    /// Shallow merge of this patch over `trip`. The id is never touched.
    pub fn apply(&self, trip: &Trip) -> Trip {
        Trip {
            id: trip.id.clone(),
            title: self.title.clone().unwrap_or_else(|| trip.title.clone()),
            destination: self
                .destination
                .clone()
                .unwrap_or_else(|| trip.destination.clone()),
            start_date: self.start_date.unwrap_or(trip.start_date),
            end_date: self.end_date.unwrap_or(trip.end_date),
            budget: self.budget.unwrap_or(trip.budget),
            status: self.status.unwrap_or(trip.status),
        }
    }
}

/// Per-status counts and budget total, as shown on a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripStats {
    pub total: usize,
    pub planning: usize,
    pub booked: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub total_budget: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripState {
    pub trips: Vec<Trip>,
    pub current_trip: Option<Trip>,
    pub in_flight_fetches: usize,
}

impl TripState {
    pub fn is_loading(&self) -> bool {
        self.in_flight_fetches > 0
    }

    pub fn find(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn stats(&self) -> TripStats {
        let mut stats = TripStats {
            total: self.trips.len(),
            ..Default::default()
        };
        for trip in &self.trips {
            match trip.status {
                TripStatus::Planning => stats.planning += 1,
                TripStatus::Booked => stats.booked += 1,
                TripStatus::Ongoing => stats.ongoing += 1,
                TripStatus::Completed => stats.completed += 1,
            }
            stats.total_budget = stats.total_budget.saturating_add(trip.budget);
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TripAction {
    FetchStarted,
    FetchSucceeded(Vec<Trip>),
    FetchFailed,
    Added(Trip),
    Updated { id: String, patch: TripPatch },
    Deleted(String),
    Selected(Option<Trip>),
}

#[derive(Debug)]
pub enum TripError {
    NotFound(String),
    DuplicateId(String),
    Backend(BackendError),
}

impl fmt::Display for TripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripError::NotFound(id) => write!(f, "trip not found: {id}"),
            TripError::DuplicateId(id) => write!(f, "duplicate trip id: {id}"),
            TripError::Backend(e) => write!(f, "trip backend error: {e}"),
        }
    }
}

impl std::error::Error for TripError {}

impl From<BackendError> for TripError {
    fn from(e: BackendError) -> Self {
        TripError::Backend(e)
    }
}

fn first_duplicate(trips: &[Trip]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(trips.len());
    trips
        .iter()
        .find(|trip| !seen.insert(trip.id.as_str()))
        .map(|trip| trip.id.as_str())
}

/// Applies `action` to `state`, returning the next snapshot.
pub fn update(state: &TripState, action: TripAction) -> Result<TripState, TripError> {
    let next = match action {
        TripAction::FetchStarted => TripState {
            in_flight_fetches: state.in_flight_fetches + 1,
            ..state.clone()
        },
        TripAction::FetchSucceeded(trips) => {
            if let Some(id) = first_duplicate(&trips) {
                return Err(TripError::DuplicateId(id.to_string()));
            }
            // Keep the focus only if the id survived the reload.
            let current_trip = state
                .current_trip
                .as_ref()
                .and_then(|current| trips.iter().find(|t| t.id == current.id).cloned());
            TripState {
                trips,
                current_trip,
                in_flight_fetches: state.in_flight_fetches.saturating_sub(1),
            }
        }
        TripAction::FetchFailed => TripState {
            in_flight_fetches: state.in_flight_fetches.saturating_sub(1),
            ..state.clone()
        },
        TripAction::Added(trip) => {
            if state.contains(&trip.id) {
                return Err(TripError::DuplicateId(trip.id));
            }
            let mut trips = state.trips.clone();
            trips.push(trip);
            TripState {
                trips,
                ..state.clone()
            }
        }
        TripAction::Updated { id, patch } => {
            let Some(position) = state.trips.iter().position(|t| t.id == id) else {
                return Err(TripError::NotFound(id));
            };
            let merged = patch.apply(&state.trips[position]);
            let mut trips = state.trips.clone();
            trips[position] = merged.clone();
            let current_trip = match &state.current_trip {
                Some(current) if current.id == id => Some(merged),
                other => other.clone(),
            };
            TripState {
                trips,
                current_trip,
                in_flight_fetches: state.in_flight_fetches,
            }
        }
        TripAction::Deleted(id) => {
            if !state.contains(&id) {
                return Err(TripError::NotFound(id));
            }
            let trips = state.trips.iter().filter(|t| t.id != id).cloned().collect();
            let current_trip = state
                .current_trip
                .clone()
                .filter(|current| current.id != id);
            TripState {
                trips,
                current_trip,
                in_flight_fetches: state.in_flight_fetches,
            }
        }
        TripAction::Selected(trip) => TripState {
            current_trip: trip,
            ..state.clone()
        },
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, sample_trip};

    fn state_with(trips: Vec<Trip>) -> TripState {
        TripState {
            trips,
            ..Default::default()
        }
    }

    fn ids(state: &TripState) -> Vec<&str> {
        state.trips.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TripStatus::Booked).unwrap();
        assert_eq!(json, "\"booked\"");
        let parsed: TripStatus = serde_json::from_str("\"ongoing\"").unwrap();
        assert_eq!(parsed, TripStatus::Ongoing);
    }

    #[test]
    fn test_trip_json_uses_camel_case() {
        let json = serde_json::to_value(sample_trip("a")).unwrap();
        assert_eq!(json["startDate"], "2024-03-15");
        assert_eq!(json["status"], "planning");
    }

    #[test]
    fn test_added_appends_in_order() {
        let mut state = TripState::default();
        for id in ["a", "b", "c"] {
            state = update(&state, TripAction::Added(sample_trip(id))).unwrap();
        }
        assert_eq!(ids(&state), vec!["a", "b", "c"]);
        assert!(state.current_trip.is_none());
    }

    #[test]
    fn test_added_rejects_duplicate_id() {
        let state = state_with(vec![sample_trip("a")]);
        let result = update(&state, TripAction::Added(sample_trip("a")));
        assert!(matches!(result, Err(TripError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_updated_merges_and_keeps_position() {
        let state = state_with(vec![sample_trip("a"), sample_trip("b"), sample_trip("c")]);
        let next = update(
            &state,
            TripAction::Updated {
                id: "b".to_string(),
                patch: TripPatch::status(TripStatus::Booked),
            },
        )
        .unwrap();
        assert_eq!(ids(&next), vec!["a", "b", "c"]);
        let b = next.find("b").unwrap();
        assert_eq!(b.status, TripStatus::Booked);
        assert_eq!(b.title, sample_trip("b").title);
        assert_eq!(b.budget, sample_trip("b").budget);
    }

    #[test]
    fn test_updated_refreshes_current_trip() {
        let mut state = state_with(vec![sample_trip("a"), sample_trip("b")]);
        state.current_trip = Some(sample_trip("a"));
        let next = update(
            &state,
            TripAction::Updated {
                id: "a".to_string(),
                patch: TripPatch::status(TripStatus::Booked),
            },
        )
        .unwrap();
        assert_eq!(next.current_trip.as_ref(), next.find("a"));
        assert_eq!(next.current_trip.unwrap().status, TripStatus::Booked);
    }

    #[test]
    fn test_updated_other_trip_leaves_current_alone() {
        let mut state = state_with(vec![sample_trip("a"), sample_trip("b")]);
        state.current_trip = Some(sample_trip("a"));
        let next = update(
            &state,
            TripAction::Updated {
                id: "b".to_string(),
                patch: TripPatch::status(TripStatus::Completed),
            },
        )
        .unwrap();
        assert_eq!(next.current_trip, Some(sample_trip("a")));
    }

    #[test]
    fn test_updated_missing_id_is_not_found() {
        let state = state_with(vec![sample_trip("a")]);
        let patch = TripPatch {
            title: Some("Z".to_string()),
            ..Default::default()
        };
        let result = update(
            &state,
            TripAction::Updated {
                id: "missing-id".to_string(),
                patch,
            },
        );
        assert!(matches!(result, Err(TripError::NotFound(id)) if id == "missing-id"));
    }

    #[test]
    fn test_deleted_clears_matching_current_trip() {
        let mut state = state_with(vec![sample_trip("a"), sample_trip("b")]);
        state.current_trip = Some(sample_trip("a"));
        let next = update(&state, TripAction::Deleted("a".to_string())).unwrap();
        assert_eq!(ids(&next), vec!["b"]);
        assert!(next.current_trip.is_none());
    }

    #[test]
    fn test_deleted_other_keeps_current_trip() {
        let mut state = state_with(vec![sample_trip("a"), sample_trip("b")]);
        state.current_trip = Some(sample_trip("a"));
        let next = update(&state, TripAction::Deleted("b".to_string())).unwrap();
        assert_eq!(next.current_trip, Some(sample_trip("a")));
    }

    #[test]
    fn test_deleted_missing_id_is_not_found() {
        let state = state_with(vec![sample_trip("a")]);
        let result = update(&state, TripAction::Deleted("zzz".to_string()));
        assert!(matches!(result, Err(TripError::NotFound(_))));
    }

    #[test]
    fn test_fetch_counter_drives_loading() {
        let state = update(&TripState::default(), TripAction::FetchStarted).unwrap();
        let state = update(&state, TripAction::FetchStarted).unwrap();
        assert!(state.is_loading());
        let state = update(&state, TripAction::FetchSucceeded(vec![sample_trip("a")])).unwrap();
        assert!(state.is_loading());
        let state = update(&state, TripAction::FetchFailed).unwrap();
        assert!(!state.is_loading());
        let state = update(&state, TripAction::FetchFailed).unwrap();
        assert_eq!(state.in_flight_fetches, 0);
    }

    #[test]
    fn test_fetch_keeps_selection_still_present() {
        let mut state = state_with(vec![sample_trip("a")]);
        state.current_trip = Some(sample_trip("a"));
        let mut reloaded = sample_trip("a");
        reloaded.title = "Reloaded".to_string();
        let next = update(&state, TripAction::FetchSucceeded(vec![reloaded.clone()])).unwrap();
        assert_eq!(next.current_trip, Some(reloaded));
    }

    #[test]
    fn test_fetch_clears_selection_that_vanished() {
        let mut state = state_with(vec![sample_trip("a")]);
        state.current_trip = Some(sample_trip("a"));
        let next = update(&state, TripAction::FetchSucceeded(vec![sample_trip("b")])).unwrap();
        assert!(next.current_trip.is_none());
    }

    #[test]
    fn test_fetch_rejects_duplicate_ids() {
        let result = update(
            &TripState::default(),
            TripAction::FetchSucceeded(vec![sample_trip("a"), sample_trip("a")]),
        );
        assert!(matches!(result, Err(TripError::DuplicateId(_))));
    }

    #[test]
    fn test_selected_accepts_trip_outside_collection() {
        let next = update(&TripState::default(), TripAction::Selected(Some(sample_trip("x")))).unwrap();
        assert_eq!(next.current_trip, Some(sample_trip("x")));
        let next = update(&next, TripAction::Selected(None)).unwrap();
        assert!(next.current_trip.is_none());
    }

    #[test]
    fn test_stats_counts_by_status() {
        let mut booked = sample_trip("b");
        booked.status = TripStatus::Booked;
        booked.budget = 500;
        let state = state_with(vec![sample_trip("a"), booked]);
        let stats = state.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.planning, 1);
        assert_eq!(stats.booked, 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.total_budget, sample_trip("a").budget + 500);
    }

    #[test]
    fn test_stats_budget_saturates() {
        let mut a = sample_trip("a");
        a.budget = u64::MAX;
        let mut b = sample_trip("b");
        b.budget = 10;
        let stats = state_with(vec![a, b]).stats();
        assert_eq!(stats.total_budget, u64::MAX);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_duration_and_daily_budget() {
        let trip = sample_trip("a");
        assert_eq!(trip.duration_days(), 7);
        assert_eq!(trip.daily_budget(), Some(357));
        assert_eq!(trip.days_until_start(date(2024, 3, 10)), 5);

        let mut same_day = trip.clone();
        same_day.end_date = same_day.start_date;
        assert_eq!(same_day.daily_budget(), None);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let patch = TripPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&sample_trip("a")), sample_trip("a"));
    }
}
