//! Bill ledger handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use stockbook_core::{Bill, CommitSummary, NewBill};

use crate::error::ApiResult;
use crate::state::AppState;

/// Body of a successful `POST /save-bill`.
#[derive(Debug, Serialize)]
pub struct SaveBillResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub summary: CommitSummary,
}

pub async fn save_bill(
    State(state): State<AppState>,
    payload: Result<Json<NewBill>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaveBillResponse>)> {
    let Json(bill) = payload?;
    bill.validate()?;

    let summary = state.db.bills().commit(&bill).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveBillResponse {
            message: "Bill saved & inventory updated successfully!",
            summary,
        }),
    ))
}

pub async fn list_bills(State(state): State<AppState>) -> ApiResult<Json<Vec<Bill>>> {
    Ok(Json(state.db.bills().list().await?))
}
