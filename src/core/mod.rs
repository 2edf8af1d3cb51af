//! # Core Domain Logic
//!
//! Session and trip state, the reducers that move them, and the ambient
//! pieces (config, token storage) the stores lean on.
//! Nothing in here knows how it is presented.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session / Trip state │
//!                    │  • Actions (events)     │
//!                    │  • update() (reducers)  │
//!                    │                         │
//!                    │  No UI. Pure reducers.  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Stores   │      │    CLI     │      │  Web UI    │
//!     │  (watch)   │      │  (clap)    │      │  (future)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`]: `Session`, `SessionAction`, and its `update()`
//! - [`trips`]: `Trip`, `TripState`, `TripAction`, and its `update()`
//! - [`storage`]: where the session token lives between runs
//! - [`config`]: `~/.wayfarer/config.toml` and its resolution

pub mod config;
pub mod session;
pub mod storage;
pub mod trips;
