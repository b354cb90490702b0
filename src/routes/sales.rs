use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::sales::{
        AssembledSale, BestSellRow, BestServiceRow, CreateSaleRequest, SaleList, SaleWithItems,
        UpdateSaleStatusRequest,
    },
    error::AppResult,
    response::{ApiResponse, Meta},
    services::sale_service,
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct BestSellList {
    pub items: Vec<BestSellRow>,
}

#[derive(Serialize, ToSchema)]
pub struct BestServiceList {
    pub items: Vec<BestServiceRow>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_sale))
        .route("/", axum::routing::get(list_sales))
        .route("/best-sells", axum::routing::get(best_sells))
        .route("/best-services", axum::routing::get(best_services))
        .route("/{id}", axum::routing::get(get_sale))
        .route("/{id}/status", axum::routing::put(update_sale_status))
}

#[utoipa::path(
    post,
    path = "/destilo/sells",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale created", body = ApiResponse<SaleWithItems>),
        (status = 400, description = "Duplicate invoice, unknown product or insufficient stock"),
    ),
    tag = "Sells"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleWithItems>>)> {
    let response = sale_service::create_sale(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/destilo/sells",
    responses(
        (status = 200, description = "List sales with their items", body = ApiResponse<SaleList>)
    ),
    tag = "Sells"
)]
pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SaleList>>> {
    Ok(Json(sale_service::list_sales(&state).await?))
}

#[utoipa::path(
    get,
    path = "/destilo/sells/{id}",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    responses(
        (status = 200, description = "Assembled sale view", body = ApiResponse<AssembledSale>),
        (status = 404, description = "Sale or customer not found"),
    ),
    tag = "Sells"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AssembledSale>>> {
    Ok(Json(sale_service::get_sale(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/destilo/sells/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    request_body = UpdateSaleStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<SaleWithItems>),
        (status = 404, description = "Sale not found"),
    ),
    tag = "Sells"
)]
pub async fn update_sale_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleStatusRequest>,
) -> AppResult<Json<ApiResponse<SaleWithItems>>> {
    Ok(Json(
        sale_service::update_sale_status(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/destilo/sells/best-sells",
    responses(
        (status = 200, description = "Best-selling products by quantity", body = ApiResponse<BestSellList>)
    ),
    tag = "Sells"
)]
pub async fn best_sells(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BestSellList>>> {
    let items = sqlx::query_as::<_, BestSellRow>(
        r#"
        SELECT producto_id, nombre,
               SUM(cantidad)::BIGINT AS total_cantidad,
               SUM(precio_total)::BIGINT AS total_monto
        FROM sale_items
        GROUP BY producto_id, nombre
        HAVING SUM(cantidad) > 0
        ORDER BY total_cantidad DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        "Productos más vendidos",
        BestSellList { items },
        Some(Meta::new(1, total.max(1), total)),
    )))
}

#[utoipa::path(
    get,
    path = "/destilo/sells/best-services",
    responses(
        (status = 200, description = "Best-selling services by quantity", body = ApiResponse<BestServiceList>)
    ),
    tag = "Sells"
)]
pub async fn best_services(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<BestServiceList>>> {
    let items = sqlx::query_as::<_, BestServiceRow>(
        r#"
        SELECT service_id, nombre,
               SUM(cantidad)::BIGINT AS total_cantidad,
               SUM(precio_total)::BIGINT AS total_monto
        FROM sale_services
        GROUP BY service_id, nombre
        HAVING SUM(cantidad) > 0
        ORDER BY total_cantidad DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        "Servicios más vendidos",
        BestServiceList { items },
        Some(Meta::new(1, total.max(1), total)),
    )))
}
