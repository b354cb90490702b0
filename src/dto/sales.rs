use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Customer, Sale, SaleItem, SaleService};

/// One entry of the `productos` array. Stock entries reference inventory by
/// `codigo`; service entries reference a service by id and may carry the
/// stock consumed to deliver it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProductEntry {
    Stock(StockLine),
    Service(ServiceLine),
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StockLine {
    pub codigo: String,
    pub cantidad: i32,
    #[serde(rename = "precioTotal")]
    pub precio_total: i64,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceLine {
    pub id: Uuid,
    pub nombre: String,
    pub cantidad: i32,
    #[serde(rename = "precioTotal")]
    pub precio_total: i64,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
    #[serde(rename = "productosAsociado", default)]
    pub productos_asociado: Vec<StockLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    pub fecha: NaiveDate,
    pub id_factura: i64,
    pub customer_id: Uuid,
    pub productos: Vec<ProductEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub services: Vec<SaleService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleList {
    pub items: Vec<SaleWithItems>,
}

/// A service line with the stock lines consumed by it attached.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceWithItems {
    pub service: SaleService,
    pub items: Vec<SaleItem>,
}

/// One entry of the assembled item list: either a sold service (with its
/// consumed stock nested) or an independently sold stock line.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SaleLine {
    Service(ServiceWithItems),
    Item(SaleItem),
}

impl SaleLine {
    pub fn fecha(&self) -> NaiveDate {
        match self {
            SaleLine::Service(s) => s.service.fecha,
            SaleLine::Item(i) => i.fecha,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssembledSale {
    pub sale: Sale,
    pub customer: Customer,
    pub items: Vec<SaleLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleStatusRequest {
    pub estado: SaleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pendiente,
    Completada,
    Cancelada,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pendiente => "pendiente",
            SaleStatus::Completada => "completada",
            SaleStatus::Cancelada => "cancelada",
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct BestSellRow {
    pub producto_id: String,
    pub nombre: String,
    pub total_cantidad: i64,
    pub total_monto: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct BestServiceRow {
    pub service_id: Uuid,
    pub nombre: String,
    pub total_cantidad: i64,
    pub total_monto: i64,
}
