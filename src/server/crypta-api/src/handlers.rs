//! Request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crypta_data::NewValue;
use crypta_storage::RecordId;

use crate::error::ApiError;
use crate::models::{DataRequest, DataResponse, HealthResponse};
use crate::AppState;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /data` - every record, ciphertext as stored.
pub async fn list_data(State(state): State<AppState>) -> Result<Json<Vec<DataResponse>>, ApiError> {
    let records = state.data.list_data().await?;
    Ok(Json(records.into_iter().map(DataResponse::from).collect()))
}

/// `GET /data/{id}/decrypted`
pub async fn get_decrypted_data(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<DataResponse>, ApiError> {
    state
        .data
        .get_decrypted_data(id)
        .await?
        .map(|record| Json(record.into()))
        .ok_or(ApiError::NotFound)
}

/// `POST /data`
pub async fn save_data(
    State(state): State<AppState>,
    payload: Result<Json<DataRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse>), ApiError> {
    let value = parse_value(payload)?;
    let record = state.data.save_data(value).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `PUT /data/{id}`
pub async fn update_data(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<DataRequest>, JsonRejection>,
) -> Result<Json<DataResponse>, ApiError> {
    let value = parse_value(payload)?;
    state
        .data
        .update_data_value(id, value)
        .await?
        .map(|record| Json(record.into()))
        .ok_or(ApiError::NotFound)
}

fn parse_value(payload: Result<Json<DataRequest>, JsonRejection>) -> Result<NewValue, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    Ok(NewValue::new(request.data.unwrap_or_default())?)
}
