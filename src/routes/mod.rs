use axum::{Json, Router, routing::get};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod customers;
pub mod doc;
pub mod general;
pub mod health;
pub mod login;
pub mod params;
pub mod password_reset;
pub mod sales;
pub mod security_questions;
pub mod services;
pub mod stocks;
pub mod suppliers;
pub mod token_validation;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .nest("/sells", sales::router())
        .nest("/stocks", stocks::router())
        .nest("/customers", customers::router())
        .nest("/suppliers", suppliers::router())
        .nest("/services", services::router())
        .nest("/users", users::router())
        .nest("/login", login::router())
        .nest("/token-validation", token_validation::router())
        .nest("/reset-password", password_reset::router())
        .nest("/security-questions", security_questions::router())
        .nest("/general", general::router())
}

async fn welcome() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        "API D-estilo Plus",
        serde_json::json!({ "status": "running" }),
        Some(Meta::empty()),
    ))
}
