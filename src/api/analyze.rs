//! Server-side scoring endpoint.

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Landmark, PostureGrade, PostureRatios};
use crate::overlay::{build_overlay, FrameSize, Overlay};
use crate::scoring::{compute_score, grade, try_compute_ratios};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub landmarks: Vec<Landmark>,
    /// When present, the response includes an overlay for this frame size
    #[serde(default)]
    pub frame: Option<FrameSize>,
}

/// Scoring result for one landmark set.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub ratios: PostureRatios,
    pub score: f64,
    pub grade: PostureGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

/// POST /api/analyze - Score a landmark set.
pub async fn analyze_posture(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(request) = payload?;

    let ratios = try_compute_ratios(&request.landmarks).ok_or_else(|| {
        AppError::Validation(format!(
            "Expected eye and shoulder landmarks, got {} landmarks",
            request.landmarks.len()
        ))
    })?;
    let score = compute_score(Some(&ratios));
    let overlay = request
        .frame
        .map(|frame| build_overlay(&request.landmarks, Some(&ratios), score, frame));

    Ok(Json(AnalyzeResponse {
        score,
        grade: grade(score),
        ratios,
        overlay,
    }))
}
