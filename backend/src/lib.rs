//! # Enroll Rust Backend
//!
//! Workshop enrollment rules engine.
//!
//! This crate models an after-school program where students pick weekly
//! workshop sessions for an academic period. It validates session choices
//! against scheduling conflicts, cohort membership and seat quotas, and
//! decides when a student may still change their schedule. The backend
//! exposes a REST API via Axum for frontend integration.
//!
//! ## Features
//!
//! - **Scheduling**: weekly time blocks with strict no-overlap semantics
//! - **Calendar**: academic periods with preview, enrollment and active
//!   windows, resolved by date
//! - **Catalog**: workshops offered per period, restricted to cycles and
//!   taught by teachers who cannot be double-booked
//! - **Enrollment**: atomic session-set changes validated for duplicates,
//!   cohort, quota and pairwise conflicts
//! - **Eligibility**: time-window policy distinguishing full from partial
//!   schedules
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: domain types and the rule-violation taxonomy
//! - [`services`]: pure rule predicates and the eligibility policy
//! - [`db`]: repository pattern, in-memory backend and the orchestration
//!   service layer
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
