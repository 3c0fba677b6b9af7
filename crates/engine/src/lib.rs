//! # geomark-engine
//!
//! The working half of the attendance tracker: a session object that owns
//! one user's in-memory state and writes mutations through the document
//! store, the periodic evaluator that turns device positions into
//! attendance records, and the aggregator that computes statistics over the
//! recorded history.
//!
//! ## Architecture
//!
//! - **Session**: in-memory copy of the user document plus write-through
//!   persistence for every mutation
//! - **Evaluator**: geofence checks on a fixed cadence, reminder and commit
//!   windows per slot
//! - **Aggregator**: attended/considered counters and percentages under the
//!   raw and modified policies
//! - **Providers**: the external collaborators (geolocation, notifications,
//!   identity) behind narrow traits
//! - **Config**: environment-driven engine settings

/// Attendance statistics over date ranges and calendar months
pub mod aggregator;
/// Environment-driven engine configuration
pub mod config;
/// Periodic geofence evaluation and record commits
pub mod evaluator;
/// Collaborator traits and their production implementations
pub mod providers;
/// Per-user state owner with write-through persistence
pub mod session;

pub mod mock;

pub use aggregator::{MonthlySummary, StatsQuery, SubjectFilter, SubjectStats};
pub use evaluator::{Evaluator, TickReport};
pub use session::{NewSlot, Session};
