use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    dto::security::{
        CreatedQuestion, QuestionSet, SetupQuestionsRequest, ValidateAnswersRequest,
        ValidationSuccess,
    },
    error::AppResult,
    response::ApiResponse,
    services::recovery_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(setup_questions))
        .route("/validate", axum::routing::post(validate_answers))
        .route("/by-email/{email}", axum::routing::get(get_questions_by_email))
        .route("/{user_id}", axum::routing::get(get_questions))
}

#[utoipa::path(
    post,
    path = "/destilo/security-questions",
    request_body = SetupQuestionsRequest,
    responses(
        (status = 201, description = "Questions configured", body = ApiResponse<Vec<CreatedQuestion>>),
        (status = 400, description = "Invalid question set"),
    ),
    tag = "Recovery"
)]
pub async fn setup_questions(
    State(state): State<AppState>,
    Json(payload): Json<SetupQuestionsRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<CreatedQuestion>>>)> {
    let response = recovery_service::setup_questions(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/destilo/security-questions/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Ordered questions, never answers", body = ApiResponse<QuestionSet>),
        (status = 400, description = "No questions configured"),
    ),
    tag = "Recovery"
)]
pub async fn get_questions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<QuestionSet>>> {
    Ok(Json(recovery_service::get_questions(&state, user_id).await?))
}

#[utoipa::path(
    get,
    path = "/destilo/security-questions/by-email/{email}",
    params(
        ("email" = String, Path, description = "Account email")
    ),
    responses(
        (status = 200, description = "Ordered questions, never answers", body = ApiResponse<QuestionSet>),
        (status = 400, description = "Unknown email or no questions configured"),
    ),
    tag = "Recovery"
)]
pub async fn get_questions_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ApiResponse<QuestionSet>>> {
    Ok(Json(
        recovery_service::get_questions_by_email(&state, &email).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/destilo/security-questions/validate",
    request_body = ValidateAnswersRequest,
    responses(
        (status = 200, description = "All answers correct, reset token issued", body = ApiResponse<ValidationSuccess>),
        (status = 400, description = "One or more answers rejected"),
    ),
    tag = "Recovery"
)]
pub async fn validate_answers(
    State(state): State<AppState>,
    Json(payload): Json<ValidateAnswersRequest>,
) -> AppResult<Json<ApiResponse<ValidationSuccess>>> {
    Ok(Json(
        recovery_service::validate_answers(&state, payload).await?,
    ))
}
