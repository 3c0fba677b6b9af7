//! # geomark-core
//!
//! Domain types for the geomark attendance tracker: subjects, weekly slot
//! schedules, attendance records, the per-user stored document, and the
//! geographic and clock arithmetic the evaluator is built on.
//!
//! This crate is pure: no I/O, no async, no storage concerns.

pub mod errors;
pub mod geo;
pub mod models;

pub use errors::{LocationError, MarkError, MarkResult};
