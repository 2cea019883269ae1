//! Posture scoring from eye and shoulder landmarks.
//!
//! The score treats a head that stays parallel to the shoulders as ideal and
//! degrades linearly with the angle between the eye line and the shoulder
//! line, reaching zero at [`ZERO_SCORE_ANGLE`] degrees.

use crate::models::{Landmark, LandmarkIndex, PostureGrade, PostureRatios};

/// Angle difference (degrees) at which the score bottoms out.
pub const ZERO_SCORE_ANGLE: f64 = 45.0;

/// Score for perfectly parallel eye and shoulder lines.
pub const MAX_SCORE: f64 = 100.0;

/// Landmarks required by [`compute_ratios`].
const REQUIRED: [LandmarkIndex; 4] = [
    LandmarkIndex::LeftEye,
    LandmarkIndex::RightEye,
    LandmarkIndex::LeftShoulder,
    LandmarkIndex::RightShoulder,
];

/// Angle of the segment `from -> to` in degrees, in (-180, 180].
pub fn line_angle(from: &Landmark, to: &Landmark) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Compute eye/shoulder angles and their parallelism.
///
/// `landmarks` must follow the 33-point body model and contain at least the
/// eye and shoulder entries; this panics otherwise. Use
/// [`try_compute_ratios`] when the input is not trusted.
pub fn compute_ratios(landmarks: &[Landmark]) -> PostureRatios {
    let left_eye = landmarks[LandmarkIndex::LeftEye.as_usize()];
    let right_eye = landmarks[LandmarkIndex::RightEye.as_usize()];
    let left_shoulder = landmarks[LandmarkIndex::LeftShoulder.as_usize()];
    let right_shoulder = landmarks[LandmarkIndex::RightShoulder.as_usize()];

    let eye_angle = line_angle(&left_eye, &right_eye);
    let shoulder_angle = line_angle(&left_shoulder, &right_shoulder);

    PostureRatios {
        eye_shoulder_parallelism: (eye_angle - shoulder_angle).abs(),
        eye_angle,
        shoulder_angle,
        left_eye,
        right_eye,
        left_shoulder,
        right_shoulder,
    }
}

/// Like [`compute_ratios`], but returns `None` when a required landmark is
/// missing from the slice.
pub fn try_compute_ratios(landmarks: &[Landmark]) -> Option<PostureRatios> {
    let needed = REQUIRED.iter().map(|i| i.as_usize()).max().unwrap_or(0);
    if landmarks.len() <= needed {
        return None;
    }
    Some(compute_ratios(landmarks))
}

/// Map ratios to a 0-100 score.
///
/// Missing ratios, or a parallelism that is not a finite number, score 0.
pub fn compute_score(ratios: Option<&PostureRatios>) -> f64 {
    match ratios {
        Some(r) => score_for_difference(r.eye_shoulder_parallelism),
        None => 0.0,
    }
}

/// Linear decay from 100 at 0 degrees to 0 at [`ZERO_SCORE_ANGLE`].
pub fn score_for_difference(difference: f64) -> f64 {
    if !difference.is_finite() {
        return 0.0;
    }
    let score = MAX_SCORE - difference * (MAX_SCORE / ZERO_SCORE_ANGLE);
    score.clamp(0.0, MAX_SCORE)
}

/// Grade band for a score.
pub fn grade(score: f64) -> PostureGrade {
    PostureGrade::from_score(score)
}
