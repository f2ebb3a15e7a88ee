//! # Stockbook API
//!
//! REST server behind the Stockbook admin console.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Components                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Auth routes   │  │ Catalog routes │  │  Bill / report routes      ││
//! │  │                │  │                │  │                            ││
//! │  │ • login-w-otp  │  │ • products     │  │ • save-bill (transaction)  ││
//! │  │ • verify-otp   │  │ • add-product  │  │ • bills                    ││
//! │  │ • login        │  │ • update-prod  │  │ • top-selling-products     ││
//! │  │ • register     │  │ • delete-prod  │  │ • sales-report             ││
//! │  │ • update-admin │  │                │  │ • dashboard-summary        ││
//! │  └───────┬────────┘  └───────┬────────┘  └─────────────┬──────────────┘│
//! │          │                   │                         │               │
//! │  ┌───────▼────────┐  ┌───────▼─────────────────────────▼──────────────┐│
//! │  │  AuthService   │  │          stockbook-db / stockbook-core         ││
//! │  │  OtpCache      │──►                                                ││
//! │  │  OtpNotifier   │  └────────────────────────────────────────────────┘│
//! │  └────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`] for the environment variables.

pub mod clock;
pub mod config;
pub mod error;
pub mod mailer;
pub mod otp_cache;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;
