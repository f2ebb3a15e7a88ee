//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook. It contains the domain types and
//! every rule that does not need a database or a network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Admin Console (single-page app)                 │   │
//! │  │    Login ──► Inventory ──► Billing ──► Reports / Dashboard      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌──────┐ │   │
//! │  │   │  types  │  │  money  │  │  auth   │  │validation│  │report│ │   │
//! │  │   │ Product │  │  Money  │  │OtpRecord│  │  rules   │  │ aggr │ │   │
//! │  │   │  Bill   │  │         │  │ verify  │  │          │  │      │ │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └──────────┘  └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (AdminAccount, Product, Bill, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`auth`] - OTP record and the verification state machine
//! - [`report`] - Sales aggregation (monthly/yearly totals, top sellers)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use stockbook_core::auth::{verify_otp, OtpRecord, OtpVerification};
//!
//! let issued_at = Utc::now();
//! let record = OtpRecord::issue("482913", issued_at, Duration::minutes(5));
//!
//! let later = issued_at + Duration::minutes(6);
//! assert_eq!(verify_otp(Some(&record), "482913", later), OtpVerification::Expired);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default lifetime of a login OTP, in seconds (5 minutes).
///
/// The email copy promises this value; change both together.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

/// Smallest OTP code that can be issued.
pub const OTP_CODE_MIN: u32 = 100_000;

/// Largest OTP code that can be issued.
pub const OTP_CODE_MAX: u32 = 999_999;

/// Largest quantity accepted for a product's stock or a single bill line.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Revenue step used for the dashboard's monthly target and milestones.
pub const MONTHLY_TARGET_STEP: Money = Money::from_cents(50_000 * 100);
