//! The single business-profile row: name, contact info, opening hours and a
//! free-form json configuration blob that updates merge into instead of
//! replacing.

use axum::{Json, Router, extract::State};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::GeneralData,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertGeneralRequest {
    #[serde(rename = "nombreNegocio")]
    pub nombre_negocio: String,
    pub descripcion: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub horario: Option<serde_json::Value>,
    #[serde(rename = "redesSociales")]
    pub redes_sociales: Option<serde_json::Value>,
    #[serde(rename = "logoUrl")]
    pub logo_url: Option<String>,
    pub configuracion: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfigUpdateRequest {
    pub configuracion: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleUpdateRequest {
    pub horario: serde_json::Value,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(get_general))
        .route("/", axum::routing::post(upsert_general))
        .route("/config", axum::routing::put(update_config))
        .route("/schedule", axum::routing::put(update_schedule))
}

#[utoipa::path(
    get,
    path = "/destilo/general",
    responses(
        (status = 200, description = "Business profile", body = ApiResponse<GeneralData>),
        (status = 404, description = "Not configured yet"),
    ),
    tag = "General"
)]
pub async fn get_general(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<GeneralData>>> {
    let row = fetch_row(&state).await?;
    match row {
        Some(row) => Ok(Json(ApiResponse::success("Datos generales", row, None))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/destilo/general",
    request_body = UpsertGeneralRequest,
    responses(
        (status = 200, description = "Profile created or updated", body = ApiResponse<GeneralData>)
    ),
    tag = "General"
)]
pub async fn upsert_general(
    State(state): State<AppState>,
    Json(payload): Json<UpsertGeneralRequest>,
) -> AppResult<Json<ApiResponse<GeneralData>>> {
    if payload.nombre_negocio.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Se requiere el nombre del negocio".into(),
        ));
    }

    let existing = fetch_row(&state).await?;

    let row = match existing {
        Some(existing) => {
            // configuracion merges key-wise; the other json fields keep their
            // stored value unless the request brings a new one.
            let configuracion = match (existing.configuracion, payload.configuracion) {
                (stored, Some(incoming)) => Some(merge_json(stored, incoming)),
                (stored, None) => stored,
            };
            let horario = payload.horario.or(existing.horario);
            let redes_sociales = payload.redes_sociales.or(existing.redes_sociales);
            let logo_url = payload.logo_url.or(existing.logo_url);

            sqlx::query_as::<_, GeneralData>(
                r#"
                UPDATE general_data
                SET nombre_negocio = $2, descripcion = $3, direccion = $4,
                    telefono = $5, email = $6, horario = $7, redes_sociales = $8,
                    logo_url = $9, configuracion = $10
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(existing.id)
            .bind(payload.nombre_negocio)
            .bind(payload.descripcion.or(existing.descripcion))
            .bind(payload.direccion.or(existing.direccion))
            .bind(payload.telefono.or(existing.telefono))
            .bind(payload.email.or(existing.email))
            .bind(horario)
            .bind(redes_sociales)
            .bind(logo_url)
            .bind(configuracion)
            .fetch_one(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, GeneralData>(
                r#"
                INSERT INTO general_data
                    (id, nombre_negocio, descripcion, direccion, telefono, email,
                     horario, redes_sociales, logo_url, configuracion)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(payload.nombre_negocio)
            .bind(payload.descripcion)
            .bind(payload.direccion)
            .bind(payload.telefono)
            .bind(payload.email)
            .bind(payload.horario)
            .bind(payload.redes_sociales)
            .bind(payload.logo_url)
            .bind(payload.configuracion)
            .fetch_one(&state.pool)
            .await?
        }
    };

    Ok(Json(ApiResponse::success(
        "Datos generales guardados",
        row,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/destilo/general/config",
    request_body = ConfigUpdateRequest,
    responses(
        (status = 200, description = "Configuration merged", body = ApiResponse<GeneralData>),
        (status = 404, description = "Not configured yet"),
    ),
    tag = "General"
)]
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<ConfigUpdateRequest>,
) -> AppResult<Json<ApiResponse<GeneralData>>> {
    let existing = match fetch_row(&state).await? {
        Some(row) => row,
        None => return Err(AppError::NotFound),
    };

    let merged = merge_json(existing.configuracion, payload.configuracion);
    let row = sqlx::query_as::<_, GeneralData>(
        "UPDATE general_data SET configuracion = $2 WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(merged)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Configuración actualizada",
        row,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/destilo/general/schedule",
    request_body = ScheduleUpdateRequest,
    responses(
        (status = 200, description = "Schedule merged", body = ApiResponse<GeneralData>),
        (status = 404, description = "Not configured yet"),
    ),
    tag = "General"
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleUpdateRequest>,
) -> AppResult<Json<ApiResponse<GeneralData>>> {
    let existing = match fetch_row(&state).await? {
        Some(row) => row,
        None => return Err(AppError::NotFound),
    };

    let merged = merge_json(existing.horario, payload.horario);
    let row = sqlx::query_as::<_, GeneralData>(
        "UPDATE general_data SET horario = $2 WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(merged)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Horario actualizado",
        row,
        Some(Meta::empty()),
    )))
}

async fn fetch_row(state: &AppState) -> AppResult<Option<GeneralData>> {
    let row = sqlx::query_as::<_, GeneralData>("SELECT * FROM general_data LIMIT 1")
        .fetch_optional(&state.pool)
        .await?;
    Ok(row)
}

/// Key-wise merge: incoming keys overwrite stored ones, everything else is
/// kept. Non-object inputs fall back to the incoming value.
fn merge_json(stored: Option<serde_json::Value>, incoming: serde_json::Value) -> serde_json::Value {
    match (stored, incoming) {
        (Some(serde_json::Value::Object(mut base)), serde_json::Value::Object(update)) => {
            for (key, value) in update {
                base.insert(key, value);
            }
            serde_json::Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_only_incoming_keys() {
        let stored = Some(json!({"moneda": "USD", "iva": 16}));
        let merged = merge_json(stored, json!({"iva": 8}));
        assert_eq!(merged, json!({"moneda": "USD", "iva": 8}));
    }

    #[test]
    fn merge_with_no_stored_value_takes_incoming() {
        let merged = merge_json(None, json!({"iva": 8}));
        assert_eq!(merged, json!({"iva": 8}));
    }

    #[test]
    fn non_object_stored_value_is_replaced() {
        let merged = merge_json(Some(json!("legacy")), json!({"iva": 8}));
        assert_eq!(merged, json!({"iva": 8}));
    }
}
