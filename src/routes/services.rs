use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Service,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub servicio: String,
    pub descripcion: Option<String>,
    pub precio: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub servicio: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceList {
    pub items: Vec<Service>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_services))
        .route("/", axum::routing::post(create_service))
        .route("/{id}", axum::routing::get(get_service))
        .route("/{id}", axum::routing::put(update_service))
        .route("/{id}", axum::routing::delete(delete_service))
}

#[utoipa::path(
    get,
    path = "/destilo/services",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Filter over servicio and descripcion"),
    ),
    responses(
        (status = 200, description = "List services", body = ApiResponse<ServiceList>)
    ),
    tag = "Services"
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let (items, total) = if let Some(pattern) = query.like_pattern() {
        let items = sqlx::query_as::<_, Service>(
            r#"
            SELECT * FROM services
            WHERE servicio ILIKE $1 OR descripcion ILIKE $1
            ORDER BY servicio
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM services WHERE servicio ILIKE $1 OR descripcion ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&state.pool)
        .await?;
        (items, total.0)
    } else {
        let items =
            sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY servicio LIMIT $1 OFFSET $2")
                .bind(per_page)
                .bind(offset)
                .fetch_all(&state.pool)
                .await?;

        let total: (i64,) = sqlx::query_as("SELECT count(*) FROM services")
            .fetch_one(&state.pool)
            .await?;
        (items, total.0)
    };

    Ok(Json(ApiResponse::success(
        "Servicios",
        ServiceList { items },
        Some(Meta::new(page, per_page, total)),
    )))
}

#[utoipa::path(
    get,
    path = "/destilo/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Get service", body = ApiResponse<Service>),
        (status = 404, description = "Service not found"),
    ),
    tag = "Services"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Service>>> {
    let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let service = match service {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Servicio", service, None)))
}

#[utoipa::path(
    post,
    path = "/destilo/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Service created", body = ApiResponse<Service>)
    ),
    tag = "Services"
)]
pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    if payload.servicio.trim().is_empty() {
        return Err(AppError::BadRequest("Se requiere el servicio".into()));
    }
    if payload.precio < 0 {
        return Err(AppError::BadRequest("El precio no puede ser negativo".into()));
    }

    let service = sqlx::query_as::<_, Service>(
        "INSERT INTO services (id, servicio, descripcion, precio) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.servicio)
    .bind(payload.descripcion)
    .bind(payload.precio)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Servicio registrado",
        service,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/destilo/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = ApiResponse<Service>),
        (status = 404, description = "Service not found"),
    ),
    tag = "Services"
)]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    let existing = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    if let Some(precio) = payload.precio {
        if precio < 0 {
            return Err(AppError::BadRequest("El precio no puede ser negativo".into()));
        }
    }

    let servicio = payload.servicio.unwrap_or(existing.servicio);
    let descripcion = payload.descripcion.or(existing.descripcion);
    let precio = payload.precio.unwrap_or(existing.precio);

    let service = sqlx::query_as::<_, Service>(
        "UPDATE services SET servicio = $2, descripcion = $3, precio = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(servicio)
    .bind(descripcion)
    .bind(precio)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Servicio actualizado",
        service,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/destilo/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service deleted"),
        (status = 404, description = "Service not found"),
    ),
    tag = "Services"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Servicio eliminado",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
