use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::services::HealthReport;
use crate::state::AppState;

/// `GET /health`. 503 while the database is unreachable or behind on
/// migrations.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
