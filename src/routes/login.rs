use axum::{Json, Router, extract::State};

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    error::AppResult,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", axum::routing::post(login))
}

#[utoipa::path(
    post,
    path = "/destilo/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Bad credentials or account not activated"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    Ok(Json(user_service::login(&state, payload).await?))
}
