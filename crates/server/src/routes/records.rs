//! Owner-scoped record endpoints.
//!
//! Every handler takes an [`AuthUser`], so the owner always comes from the
//! verified token and never from the request body.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use babytrack_core::{ClientRecordId, RecordKind};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Record, RecordFields};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Body of `POST /api/records`.
///
/// Any `user` field the client sends is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecordRequest {
    pub id: ClientRecordId,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(default)]
    pub feeding_type: Option<String>,
    #[serde(default)]
    pub diaper_type: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub timestamp: i64,
}

impl UpsertRecordRequest {
    /// Split into the record key and the fields to write.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `date` or `time` is blank.
    pub fn into_parts(self) -> Result<(ClientRecordId, RecordFields)> {
        if self.date.trim().is_empty() {
            return Err(AppError::BadRequest("date is required".to_string()));
        }
        if self.time.trim().is_empty() {
            return Err(AppError::BadRequest("time is required".to_string()));
        }

        Ok((
            self.id,
            RecordFields {
                date: self.date,
                time: self.time,
                kind: self.kind,
                feeding_type: self.feeding_type,
                diaper_type: self.diaper_type,
                details: self.details,
                amount: self.amount,
                timestamp: self.timestamp,
            },
        ))
    }
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// `POST /api/records`
pub async fn upsert(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiJson(req): ApiJson<UpsertRecordRequest>,
) -> Result<(StatusCode, Json<Record>)> {
    let (id, fields) = req.into_parts()?;
    let record = state.records().upsert(owner, id, fields).await?;

    tracing::info!(
        user_id = %owner,
        record_id = %id,
        kind = %record.kind,
        "Record saved"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/records`
pub async fn list(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<Json<Vec<Record>>> {
    let records = state.records().list_by_owner(owner).await?;
    tracing::debug!(user_id = %owner, count = records.len(), "Listed records");
    Ok(Json(records))
}

/// `DELETE /api/records/{id}`
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<ClientRecordId>,
) -> Result<Json<DeleteResponse>> {
    state
        .records()
        .delete_by_owner_and_id(owner, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Record not found".to_string()))?;

    tracing::info!(user_id = %owner, record_id = %id, "Record deleted");
    Ok(Json(DeleteResponse {
        message: "Record deleted",
    }))
}
