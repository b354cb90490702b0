use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Wire format keeps the field names the frontend already speaks
/// (precioUnitario, razonSocial, ...); database columns are snake_case.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Customer {
    pub id: Uuid,
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
    #[serde(rename = "fechaRegistro")]
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Supplier {
    pub id: Uuid,
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
    #[serde(rename = "fechaRegistro")]
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub servicio: String,
    pub descripcion: Option<String>,
    pub precio: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Stock {
    pub id: Uuid,
    pub codigo: String,
    pub producto: String,
    pub cantidad: i32,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
    pub proveedor_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub fecha: NaiveDate,
    pub id_factura: i64,
    pub customer_id: Uuid,
    pub estado: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SaleItem {
    pub id: Uuid,
    pub sell_id: Uuid,
    pub producto_id: String,
    pub nombre: String,
    pub cantidad: i32,
    pub fecha: NaiveDate,
    #[serde(rename = "precioTotal")]
    pub precio_total: i64,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SaleService {
    pub id: Uuid,
    pub sell_id: Uuid,
    pub service_id: Uuid,
    pub nombre: String,
    pub cantidad: i32,
    pub fecha: NaiveDate,
    #[serde(rename = "precioTotal")]
    pub precio_total: i64,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: i64,
}

/// Public projection of a user row; the password hash never leaves the crate.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Question text as shown to the user during recovery; answer hashes are
/// never serialized.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SecurityQuestionView {
    pub id: Uuid,
    pub question_text: String,
    pub question_order: i16,
    pub is_custom: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct GeneralData {
    pub id: Uuid,
    pub nombre_negocio: String,
    pub descripcion: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub horario: Option<serde_json::Value>,
    pub redes_sociales: Option<serde_json::Value>,
    pub logo_url: Option<String>,
    pub configuracion: Option<serde_json::Value>,
}
