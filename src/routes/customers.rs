use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub cedula: String,
    pub cliente: String,
    pub email: String,
    pub telefono: Option<String>,
    pub rif: Option<String>,
    pub empresa: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: Option<String>,
    pub nrocasa: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_customers))
        .route("/", axum::routing::post(create_customer))
        .route("/{id}", axum::routing::delete(delete_customer))
}

#[utoipa::path(
    get,
    path = "/destilo/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Filter over cedula, cliente, email, empresa and telefono"),
    ),
    responses(
        (status = 200, description = "List customers", body = ApiResponse<CustomerList>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let (page, per_page, offset) = query.pagination.normalize();
    let pattern = query.like_pattern();

    let (items, total) = if let Some(pattern) = pattern {
        let items = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE cedula ILIKE $1 OR cliente ILIKE $1 OR email ILIKE $1
               OR empresa ILIKE $1 OR telefono ILIKE $1
            ORDER BY fecha_registro DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT count(*) FROM customers
            WHERE cedula ILIKE $1 OR cliente ILIKE $1 OR email ILIKE $1
               OR empresa ILIKE $1 OR telefono ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&state.pool)
        .await?;
        (items, total.0)
    } else {
        let items = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers ORDER BY fecha_registro DESC LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT count(*) FROM customers")
            .fetch_one(&state.pool)
            .await?;
        (items, total.0)
    };

    let meta = Meta::new(page, per_page, total);
    Ok(Json(ApiResponse::success(
        "Clientes",
        CustomerList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    post,
    path = "/destilo/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer created, or the existing customer when the cedula, name or email is already registered", body = ApiResponse<Customer>)
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    if payload.cedula.trim().is_empty()
        || payload.cliente.trim().is_empty()
        || payload.email.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Se requieren cedula, cliente y email".into(),
        ));
    }

    // Registering an already-known customer is not an error: the existing row
    // comes back so a sale in progress can continue with it. Any of the three
    // identifying fields counts as a match.
    let existing = sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers WHERE cedula = $1 OR cliente = $2 OR email = $3",
    )
    .bind(&payload.cedula)
    .bind(&payload.cliente)
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?;
    if let Some(existing) = existing {
        return Ok(Json(ApiResponse::success(
            "Cliente ya registrado",
            existing,
            Some(Meta::empty()),
        )));
    }

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers
            (id, cedula, cliente, email, telefono, rif, empresa, direccion,
             ciudad, provincia, pais, nrocasa)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.cedula)
    .bind(payload.cliente)
    .bind(payload.email)
    .bind(payload.telefono)
    .bind(payload.rif)
    .bind(payload.empresa)
    .bind(payload.direccion)
    .bind(payload.ciudad)
    .bind(payload.provincia)
    .bind(payload.pais)
    .bind(payload.nrocasa)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Cliente registrado",
        customer,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/destilo/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Cliente eliminado",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
