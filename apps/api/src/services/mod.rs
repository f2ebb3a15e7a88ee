//! Services behind the HTTP handlers.
//!
//! Catalog, bill and report handlers talk to `stockbook-db` and
//! `stockbook-core` directly; only flows with several collaborators get a
//! service type.

pub mod auth_service;
pub mod health_service;

pub use auth_service::AuthService;
pub use health_service::{HealthReport, HealthService};
