use axum::{
    Json, Router,
    extract::{Path, State},
};

use crate::{
    dto::auth::ActivationResult,
    error::AppResult,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{token}", axum::routing::get(validate_token))
}

#[utoipa::path(
    get,
    path = "/destilo/token-validation/{token}",
    params(
        ("token" = String, Path, description = "Activation token from the email link")
    ),
    responses(
        (status = 200, description = "Account activated", body = ApiResponse<ActivationResult>),
        (status = 400, description = "Expired token or already-activated account"),
        (status = 404, description = "Unknown token"),
    ),
    tag = "Auth"
)]
pub async fn validate_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<ActivationResult>>> {
    Ok(Json(user_service::activate_account(&state, &token).await?))
}
