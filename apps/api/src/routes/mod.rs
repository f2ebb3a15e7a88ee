//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Health check
//!
//! # Auth
//! POST   /login-with-otp          - Password step, emails a code
//! POST   /verify-login-otp        - Code step
//! POST   /login                   - Single-step password login
//! POST   /register                - Create an admin account
//! PUT    /update-admin            - Change name / password
//!
//! # Catalog
//! GET    /products                - List products
//! POST   /add-product             - Create product
//! PUT    /update-product/{id}     - Replace product fields
//! DELETE /delete-product/{id}     - Remove product
//!
//! # Bills
//! POST   /save-bill               - Commit a bill and decrement stock
//! GET    /bills                   - Bill ledger
//!
//! # Reports
//! GET    /top-selling-products    - Ranking (?month=YYYY-MM | ?year=YYYY)
//! GET    /sales-report            - Monthly and yearly totals
//! GET    /dashboard-summary       - Month overview (?month=YYYY-MM)
//! ```

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub mod auth;
pub mod bills;
pub mod health;
pub mod products;
pub mod reports;

/// Builds the application router with CORS and request tracing.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Auth
        .route("/login-with-otp", post(auth::login_with_otp))
        .route("/verify-login-otp", post(auth::verify_login_otp))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/update-admin", put(auth::update_admin))
        // Catalog
        .route("/products", get(products::list_products))
        .route("/add-product", post(products::add_product))
        .route("/update-product/{id}", put(products::update_product))
        .route("/delete-product/{id}", delete(products::delete_product))
        // Bills
        .route("/save-bill", post(bills::save_bill))
        .route("/bills", get(bills::list_bills))
        // Reports
        .route("/top-selling-products", get(reports::top_selling_products))
        .route("/sales-report", get(reports::sales_report))
        .route("/dashboard-summary", get(reports::dashboard_summary))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for an explicit origin list.
///
/// Unparseable origins are skipped. An empty list admits no cross-origin
/// callers.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
