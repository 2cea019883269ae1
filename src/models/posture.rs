//! Per-frame posture measurements.

use serde::{Deserialize, Serialize};

use super::Landmark;

/// Eye and shoulder line angles derived from one frame.
///
/// Serialized in camelCase because the client stores this record verbatim as
/// `current_posture` in check records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureRatios {
    /// Absolute difference between eye and shoulder angles, in degrees
    pub eye_shoulder_parallelism: f64,
    pub eye_angle: f64,
    pub shoulder_angle: f64,
    pub left_eye: Landmark,
    pub right_eye: Landmark,
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
}

/// Qualitative band for a posture score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureGrade {
    Excellent,
    Good,
    NeedsImprovement,
}

impl PostureGrade {
    pub const EXCELLENT_MIN: f64 = 85.0;
    pub const GOOD_MIN: f64 = 70.0;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::EXCELLENT_MIN {
            PostureGrade::Excellent
        } else if score >= Self::GOOD_MIN {
            PostureGrade::Good
        } else {
            PostureGrade::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostureGrade::Excellent => "Excellent!",
            PostureGrade::Good => "Good",
            PostureGrade::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PostureGrade::Excellent => "#44ff44",
            PostureGrade::Good => "#ffaa00",
            PostureGrade::NeedsImprovement => "#ff4444",
        }
    }
}
