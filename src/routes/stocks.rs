use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Stock,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

/// Stock row with the joined supplier columns the inventory screen shows.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct StockWithSupplier {
    pub id: Uuid,
    pub codigo: String,
    pub producto: String,
    pub cantidad: i32,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
    pub proveedor_id: Uuid,
    #[serde(rename = "proveedorNombre")]
    pub proveedor_nombre: String,
    #[serde(rename = "proveedorRazonSocial")]
    pub proveedor_razon_social: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStockRequest {
    pub codigo: String,
    pub producto: String,
    pub cantidad: i32,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
    pub proveedor_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub codigo: Option<String>,
    pub producto: Option<String>,
    pub cantidad: Option<i32>,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: Option<i64>,
    pub proveedor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub cantidad: i32,
}

#[derive(Serialize, ToSchema)]
pub struct StockList {
    pub items: Vec<StockWithSupplier>,
}

const STOCK_SELECT: &str = r#"
    SELECT s.id, s.codigo, s.producto, s.cantidad, s.precio_unitario,
           s.proveedor_id,
           p.nombre AS proveedor_nombre, p.razon_social AS proveedor_razon_social
    FROM stocks s
    JOIN suppliers p ON p.id = s.proveedor_id
"#;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_stocks))
        .route("/", axum::routing::post(create_stock))
        .route("/{id}", axum::routing::get(get_stock))
        .route("/{id}", axum::routing::put(update_stock))
        .route("/{id}", axum::routing::delete(delete_stock))
        .route("/{id}/quantity", axum::routing::patch(set_quantity))
}

#[utoipa::path(
    get,
    path = "/destilo/stocks",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Filter over producto, codigo and the supplier's nombre/razon_social"),
    ),
    responses(
        (status = 200, description = "List stock with supplier info", body = ApiResponse<StockList>)
    ),
    tag = "Stocks"
)]
pub async fn list_stocks(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<StockList>>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let (items, total) = if let Some(pattern) = query.like_pattern() {
        let sql = format!(
            "{STOCK_SELECT}
            WHERE s.producto ILIKE $1 OR s.codigo ILIKE $1
               OR p.nombre ILIKE $1 OR p.razon_social ILIKE $1
            ORDER BY s.producto
            LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, StockWithSupplier>(&sql)
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&state.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT count(*)
            FROM stocks s JOIN suppliers p ON p.id = s.proveedor_id
            WHERE s.producto ILIKE $1 OR s.codigo ILIKE $1
               OR p.nombre ILIKE $1 OR p.razon_social ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&state.pool)
        .await?;
        (items, total.0)
    } else {
        let sql = format!("{STOCK_SELECT} ORDER BY s.producto LIMIT $1 OFFSET $2");
        let items = sqlx::query_as::<_, StockWithSupplier>(&sql)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&state.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT count(*) FROM stocks")
            .fetch_one(&state.pool)
            .await?;
        (items, total.0)
    };

    Ok(Json(ApiResponse::success(
        "Inventario",
        StockList { items },
        Some(Meta::new(page, per_page, total)),
    )))
}

#[utoipa::path(
    get,
    path = "/destilo/stocks/{id}",
    params(
        ("id" = Uuid, Path, description = "Stock ID")
    ),
    responses(
        (status = 200, description = "Get stock", body = ApiResponse<StockWithSupplier>),
        (status = 404, description = "Stock not found"),
    ),
    tag = "Stocks"
)]
pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StockWithSupplier>>> {
    let sql = format!("{STOCK_SELECT} WHERE s.id = $1");
    let stock = sqlx::query_as::<_, StockWithSupplier>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let stock = match stock {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Producto", stock, None)))
}

#[utoipa::path(
    post,
    path = "/destilo/stocks",
    request_body = CreateStockRequest,
    responses(
        (status = 200, description = "Stock created", body = ApiResponse<Stock>),
        (status = 400, description = "Duplicate codigo or invalid fields"),
    ),
    tag = "Stocks"
)]
pub async fn create_stock(
    State(state): State<AppState>,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<Json<ApiResponse<Stock>>> {
    if payload.codigo.trim().is_empty() || payload.producto.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Se requieren codigo y producto".into(),
        ));
    }
    if payload.cantidad < 0 {
        return Err(AppError::BadRequest(
            "La cantidad no puede ser negativa".into(),
        ));
    }

    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stocks WHERE codigo = $1")
        .bind(&payload.codigo)
        .fetch_optional(&state.pool)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(format!(
            "Ya existe un producto con el código {}",
            payload.codigo
        )));
    }

    let stock = sqlx::query_as::<_, Stock>(
        r#"
        INSERT INTO stocks (id, codigo, producto, cantidad, precio_unitario, proveedor_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, codigo, producto, cantidad, precio_unitario, proveedor_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.codigo)
    .bind(payload.producto)
    .bind(payload.cantidad)
    .bind(payload.precio_unitario)
    .bind(payload.proveedor_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Producto registrado",
        stock,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/destilo/stocks/{id}",
    params(
        ("id" = Uuid, Path, description = "Stock ID")
    ),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Updated stock", body = ApiResponse<Stock>),
        (status = 400, description = "Codigo already taken"),
        (status = 404, description = "Stock not found"),
    ),
    tag = "Stocks"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockRequest>,
) -> AppResult<Json<ApiResponse<Stock>>> {
    let existing = sqlx::query_as::<_, Stock>(
        "SELECT id, codigo, producto, cantidad, precio_unitario, proveedor_id FROM stocks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    if let Some(codigo) = payload.codigo.as_deref() {
        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM stocks WHERE codigo = $1 AND id <> $2")
                .bind(codigo)
                .bind(id)
                .fetch_optional(&state.pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest(format!(
                "Ya existe un producto con el código {codigo}"
            )));
        }
    }
    if let Some(cantidad) = payload.cantidad {
        if cantidad < 0 {
            return Err(AppError::BadRequest(
                "La cantidad no puede ser negativa".into(),
            ));
        }
    }

    let codigo = payload.codigo.unwrap_or(existing.codigo);
    let producto = payload.producto.unwrap_or(existing.producto);
    let cantidad = payload.cantidad.unwrap_or(existing.cantidad);
    let precio_unitario = payload.precio_unitario.unwrap_or(existing.precio_unitario);
    let proveedor_id = payload.proveedor_id.unwrap_or(existing.proveedor_id);

    let stock = sqlx::query_as::<_, Stock>(
        r#"
        UPDATE stocks
        SET codigo = $2, producto = $3, cantidad = $4, precio_unitario = $5,
            proveedor_id = $6
        WHERE id = $1
        RETURNING id, codigo, producto, cantidad, precio_unitario, proveedor_id
        "#,
    )
    .bind(id)
    .bind(codigo)
    .bind(producto)
    .bind(cantidad)
    .bind(precio_unitario)
    .bind(proveedor_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Producto actualizado",
        stock,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/destilo/stocks/{id}/quantity",
    params(
        ("id" = Uuid, Path, description = "Stock ID")
    ),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity set", body = ApiResponse<Stock>),
        (status = 400, description = "Negative quantity"),
        (status = 404, description = "Stock not found"),
    ),
    tag = "Stocks"
)]
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<ApiResponse<Stock>>> {
    if payload.cantidad < 0 {
        return Err(AppError::BadRequest(
            "La cantidad no puede ser negativa".into(),
        ));
    }

    let stock = sqlx::query_as::<_, Stock>(
        r#"
        UPDATE stocks SET cantidad = $2 WHERE id = $1
        RETURNING id, codigo, producto, cantidad, precio_unitario, proveedor_id
        "#,
    )
    .bind(id)
    .bind(payload.cantidad)
    .fetch_optional(&state.pool)
    .await?;

    match stock {
        Some(stock) => Ok(Json(ApiResponse::success(
            "Cantidad actualizada",
            stock,
            Some(Meta::empty()),
        ))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/destilo/stocks/{id}",
    params(
        ("id" = Uuid, Path, description = "Stock ID")
    ),
    responses(
        (status = 200, description = "Stock deleted"),
        (status = 404, description = "Stock not found"),
    ),
    tag = "Stocks"
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Producto eliminado",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
