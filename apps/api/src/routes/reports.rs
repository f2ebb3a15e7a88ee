//! Report handlers.
//!
//! Each call loads the full ledger and catalog and aggregates in memory with
//! `stockbook_core::report`; nothing is cached.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;

use stockbook_core::report::{self, DashboardSummary, ReportWindow, SalesReport, TopSeller};

use crate::error::ApiResult;
use crate::state::AppState;

/// `?month=YYYY-MM&year=YYYY`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

pub async fn top_selling_products(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<Vec<TopSeller>>> {
    let window = ReportWindow::from_query(query.month.as_deref(), query.year.as_deref())?;

    let bills = state.db.bills().list().await?;
    let products = state.db.products().list().await?;

    Ok(Json(report::top_sellers(&bills, &products, &window)))
}

pub async fn sales_report(State(state): State<AppState>) -> ApiResult<Json<SalesReport>> {
    let bills = state.db.bills().list().await?;
    Ok(Json(report::sales_report(&bills)))
}

/// `GET /dashboard-summary`. Defaults to the current month.
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<DashboardSummary>> {
    let (year, month) = match query.month.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(raw) => report::parse_year_month(raw.trim())?,
        None => {
            let today = state.clock.now().date_naive();
            (today.year(), today.month())
        }
    };

    let bills = state.db.bills().list().await?;
    let products = state.db.products().list().await?;

    Ok(Json(report::dashboard_summary(&bills, &products, year, month)?))
}
