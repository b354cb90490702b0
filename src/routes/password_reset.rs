use axum::{
    Json, Router,
    extract::{Path, State},
};

use crate::{
    dto::{
        auth::{RequestPasswordReset, ResetPasswordRequest},
        security::RecoveryState,
    },
    error::AppResult,
    models::UserPublic,
    response::ApiResponse,
    services::recovery_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", axum::routing::post(request_reset))
        .route("/reset", axum::routing::put(reset_password))
        .route("/state/{email}", axum::routing::get(recovery_state))
}

#[utoipa::path(
    post,
    path = "/destilo/reset-password/request",
    request_body = RequestPasswordReset,
    responses(
        (status = 200, description = "Reset email sent", body = ApiResponse<UserPublic>),
        (status = 401, description = "Account not activated"),
        (status = 404, description = "Unknown email"),
    ),
    tag = "Recovery"
)]
pub async fn request_reset(
    State(state): State<AppState>,
    Json(payload): Json<RequestPasswordReset>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    Ok(Json(recovery_service::request_reset(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/destilo/reset-password/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<UserPublic>),
        (status = 400, description = "Invalid or expired token"),
    ),
    tag = "Recovery"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    Ok(Json(recovery_service::reset_password(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/destilo/reset-password/state/{email}",
    params(
        ("email" = String, Path, description = "Account email")
    ),
    responses(
        (status = 200, description = "Where the account stands in the recovery flow", body = ApiResponse<RecoveryState>),
        (status = 404, description = "Unknown email"),
    ),
    tag = "Recovery"
)]
pub async fn recovery_state(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ApiResponse<RecoveryState>>> {
    Ok(Json(recovery_service::recovery_state(&state, &email).await?))
}
