//! Posture history API endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{
    iso_timestamp, PostureCheckRecord, ReferenceView, SavePostureRequest, SaveResponse,
};
use crate::AppState;

const SAVED_MESSAGE: &str = "Posture data saved successfully";

/// POST /api/save-posture - Set the reference or append a posture check.
pub async fn save_posture(
    State(state): State<AppState>,
    payload: Result<Json<SavePostureRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Json(request) = payload?;

    match request {
        SavePostureRequest::GoodPosture { data } => {
            let measurements = data.ok_or_else(|| {
                AppError::Validation("Field 'data' is required for good_posture".to_string())
            })?;
            state.store.set_reference(measurements).await?;
        }
        SavePostureRequest::PostureCheck {
            current,
            differences,
            score,
            timestamp,
        } => {
            let current = current.ok_or_else(|| {
                AppError::Validation("Field 'current' is required for posture_check".to_string())
            })?;
            let score = score.ok_or_else(|| {
                AppError::Validation("Field 'score' is required for posture_check".to_string())
            })?;
            if !score.is_number() {
                return Err(AppError::Validation(
                    "Field 'score' must be a number".to_string(),
                ));
            }
            let timestamp =
                timestamp.unwrap_or_else(|| Value::String(iso_timestamp(Utc::now())));

            state
                .store
                .append_check(current, differences, score, timestamp)
                .await?;
        }
    }

    Ok(Json(SaveResponse::ok(SAVED_MESSAGE)))
}

/// GET /api/good-posture - Get the reference posture or `{"status": "not_set"}`.
pub async fn get_good_posture(
    State(state): State<AppState>,
) -> Result<Json<ReferenceView>, AppError> {
    Ok(Json(state.store.reference().await?))
}

/// GET /api/posture-history - List all posture checks in insertion order.
pub async fn get_posture_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostureCheckRecord>>, AppError> {
    Ok(Json(state.store.history().await?))
}
