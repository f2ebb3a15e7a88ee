//! Login, registration and profile handlers.
//!
//! Login outcomes are 200 responses carrying a `status` discriminator; only
//! malformed requests and server failures are errors.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::auth::{LegacyLoginOutcome, OtpRequestOutcome, OtpVerification};
use stockbook_core::{AdminAccount, Credentials, ProfileUpdate, Registration};

use crate::error::ApiResult;
use crate::state::AppState;

/// Body of `POST /verify-login-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

pub async fn login_with_otp(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<OtpRequestOutcome>> {
    let Json(credentials) = payload?;
    let outcome = state.auth.request_otp(&credentials).await?;
    Ok(Json(outcome))
}

pub async fn verify_login_otp(
    State(state): State<AppState>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> ApiResult<Json<OtpVerification>> {
    let Json(request) = payload?;
    Ok(Json(state.auth.verify_otp(&request.email, &request.otp).await))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<LegacyLoginOutcome>> {
    let Json(credentials) = payload?;
    let outcome = state.auth.legacy_login(&credentials).await?;
    Ok(Json(outcome))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<Json<AdminAccount>> {
    let Json(registration) = payload?;
    let account = state.auth.register(&registration).await?;
    Ok(Json(account))
}

/// `PUT /update-admin`. An unknown email is a 404 with the same
/// `status`/`message` shape as the login responses.
pub async fn update_admin(
    State(state): State<AppState>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(update) = payload?;
    let response = match state.auth.update_profile(&update).await? {
        Some(_) => Json(json!({ "status": "success" })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": "no record exists" })),
        )
            .into_response(),
    };
    Ok(response)
}
