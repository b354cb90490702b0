use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Supplier,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub nombre: String,
    #[serde(rename = "razonSocial")]
    pub razon_social: Option<String>,
    pub rif: Option<String>,
    pub cargo: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub webrrss: Option<String>,
    pub productos: Option<String>,
    pub servicios: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub nombre: Option<String>,
    #[serde(rename = "razonSocial")]
    pub razon_social: Option<String>,
    pub rif: Option<String>,
    pub cargo: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub webrrss: Option<String>,
    pub productos: Option<String>,
    pub servicios: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SupplierList {
    pub items: Vec<Supplier>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_suppliers))
        .route("/", axum::routing::post(create_supplier))
        .route("/{id}", axum::routing::get(get_supplier))
        .route("/{id}", axum::routing::put(update_supplier))
        .route("/{id}", axum::routing::delete(delete_supplier))
}

#[utoipa::path(
    get,
    path = "/destilo/suppliers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Filter over nombre, razon_social and rif"),
    ),
    responses(
        (status = 200, description = "List suppliers", body = ApiResponse<SupplierList>)
    ),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let (items, total) = if let Some(pattern) = query.like_pattern() {
        let items = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT * FROM suppliers
            WHERE nombre ILIKE $1 OR razon_social ILIKE $1 OR rif ILIKE $1
            ORDER BY nombre
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM suppliers WHERE nombre ILIKE $1 OR razon_social ILIKE $1 OR rif ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&state.pool)
        .await?;
        (items, total.0)
    } else {
        let items =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY nombre LIMIT $1 OFFSET $2")
                .bind(per_page)
                .bind(offset)
                .fetch_all(&state.pool)
                .await?;

        let total: (i64,) = sqlx::query_as("SELECT count(*) FROM suppliers")
            .fetch_one(&state.pool)
            .await?;
        (items, total.0)
    };

    Ok(Json(ApiResponse::success(
        "Proveedores",
        SupplierList { items },
        Some(Meta::new(page, per_page, total)),
    )))
}

#[utoipa::path(
    get,
    path = "/destilo/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 200, description = "Get supplier", body = ApiResponse<Supplier>),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let supplier = match supplier {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Proveedor", supplier, None)))
}

#[utoipa::path(
    post,
    path = "/destilo/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 200, description = "Supplier created", body = ApiResponse<Supplier>)
    ),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    if payload.nombre.trim().is_empty() {
        return Err(AppError::BadRequest("Se requiere el nombre".into()));
    }

    let supplier = sqlx::query_as::<_, Supplier>(
        r#"
        INSERT INTO suppliers
            (id, nombre, razon_social, rif, cargo, telefono, email, webrrss,
             productos, servicios)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.nombre)
    .bind(payload.razon_social)
    .bind(payload.rif)
    .bind(payload.cargo)
    .bind(payload.telefono)
    .bind(payload.email)
    .bind(payload.webrrss)
    .bind(payload.productos)
    .bind(payload.servicios)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Proveedor registrado",
        supplier,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/destilo/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Updated supplier", body = ApiResponse<Supplier>),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let existing = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let nombre = payload.nombre.unwrap_or(existing.nombre);
    let razon_social = payload.razon_social.or(existing.razon_social);
    let rif = payload.rif.or(existing.rif);
    let cargo = payload.cargo.or(existing.cargo);
    let telefono = payload.telefono.or(existing.telefono);
    let email = payload.email.or(existing.email);
    let webrrss = payload.webrrss.or(existing.webrrss);
    let productos = payload.productos.or(existing.productos);
    let servicios = payload.servicios.or(existing.servicios);

    let supplier = sqlx::query_as::<_, Supplier>(
        r#"
        UPDATE suppliers
        SET nombre = $2, razon_social = $3, rif = $4, cargo = $5, telefono = $6,
            email = $7, webrrss = $8, productos = $9, servicios = $10
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(nombre)
    .bind(razon_social)
    .bind(rif)
    .bind(cargo)
    .bind(telefono)
    .bind(email)
    .bind(webrrss)
    .bind(productos)
    .bind(servicios)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Proveedor actualizado",
        supplier,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/destilo/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 200, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Proveedor eliminado",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
