//! Draw lists for the live camera overlay.
//!
//! Nothing here touches a canvas. [`build_overlay`] turns landmarks, ratios
//! and a score into pixel-space primitives that a front-end can paint as-is.

use serde::{Deserialize, Serialize};

use crate::models::{Landmark, LandmarkIndex, PostureGrade, PostureRatios};

/// Landmarks at or below this visibility are not drawn.
pub const VISIBILITY_THRESHOLD: f64 = 0.3;

/// Body skeleton connections (arms, torso, legs).
pub const SKELETON_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 12] = [
    // Arms
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // Torso
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    // Legs
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    // Hips and shoulders
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
];

pub const SKELETON_COLOR: &str = "#00FF00";
pub const EYE_LINE_COLOR: &str = "#00FFFF";
pub const SHOULDER_LINE_COLOR: &str = "#FF00FF";

const SKELETON_WIDTH: f64 = 2.0;
const GUIDE_WIDTH: f64 = 3.0;
const LANDMARK_RADIUS: f64 = 4.0;
const MARKER_RADIUS: f64 = 5.0;

/// Badge geometry, relative to the top-right corner of the frame.
const BADGE_RIGHT_INSET: f64 = 120.0;
const BADGE_TOP: f64 = 80.0;
const BADGE_WIDTH: f64 = 200.0;
const BADGE_HEIGHT: f64 = 120.0;

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: String,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub center: (f64, f64),
    pub radius: f64,
    pub color: String,
    pub alpha: f64,
}

/// Score box shown in the top-right corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBadge {
    /// Center of the badge
    pub center: (f64, f64),
    pub width: f64,
    pub height: f64,
    /// Rounded percentage, e.g. `"87%"`
    pub text: String,
    pub label: String,
    pub color: String,
}

/// Everything to paint for one frame, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub skeleton: Vec<Segment>,
    pub landmarks: Vec<Dot>,
    pub guides: Vec<Segment>,
    pub markers: Vec<Dot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<ScoreBadge>,
}

/// Build the overlay for one frame.
///
/// Skeleton segments and landmark dots are emitted only for visible
/// landmarks. Guide lines and the badge require ratios; without them only the
/// skeleton is drawn.
pub fn build_overlay(
    landmarks: &[Landmark],
    ratios: Option<&PostureRatios>,
    score: f64,
    frame: FrameSize,
) -> Overlay {
    let mut overlay = Overlay {
        skeleton: skeleton_segments(landmarks, frame),
        landmarks: landmark_dots(landmarks, frame),
        ..Overlay::default()
    };

    if let Some(ratios) = ratios {
        let (guides, markers) = guide_lines(ratios, frame);
        overlay.guides = guides;
        overlay.markers = markers;
        overlay.badge = Some(score_badge(score, frame));
    }

    overlay
}

fn skeleton_segments(landmarks: &[Landmark], frame: FrameSize) -> Vec<Segment> {
    SKELETON_CONNECTIONS
        .iter()
        .filter_map(|&(start, end)| {
            let a = landmarks.get(start.as_usize())?;
            let b = landmarks.get(end.as_usize())?;
            if !a.is_visible(VISIBILITY_THRESHOLD) || !b.is_visible(VISIBILITY_THRESHOLD) {
                return None;
            }
            Some(Segment {
                from: a.to_pixel(frame.width, frame.height),
                to: b.to_pixel(frame.width, frame.height),
                color: SKELETON_COLOR.to_string(),
                line_width: SKELETON_WIDTH,
            })
        })
        .collect()
}

fn landmark_dots(landmarks: &[Landmark], frame: FrameSize) -> Vec<Dot> {
    landmarks
        .iter()
        .filter(|lm| lm.is_visible(VISIBILITY_THRESHOLD))
        .map(|lm| Dot {
            center: lm.to_pixel(frame.width, frame.height),
            radius: LANDMARK_RADIUS,
            color: SKELETON_COLOR.to_string(),
            alpha: lm.visibility,
        })
        .collect()
}

fn guide_lines(ratios: &PostureRatios, frame: FrameSize) -> (Vec<Segment>, Vec<Dot>) {
    let lines = [
        (&ratios.left_eye, &ratios.right_eye, EYE_LINE_COLOR),
        (
            &ratios.left_shoulder,
            &ratios.right_shoulder,
            SHOULDER_LINE_COLOR,
        ),
    ];

    let mut guides = Vec::with_capacity(2);
    let mut markers = Vec::with_capacity(4);
    for (left, right, color) in lines {
        let from = left.to_pixel(frame.width, frame.height);
        let to = right.to_pixel(frame.width, frame.height);
        guides.push(Segment {
            from,
            to,
            color: color.to_string(),
            line_width: GUIDE_WIDTH,
        });
        for center in [from, to] {
            markers.push(Dot {
                center,
                radius: MARKER_RADIUS,
                color: color.to_string(),
                alpha: 1.0,
            });
        }
    }

    (guides, markers)
}

fn score_badge(score: f64, frame: FrameSize) -> ScoreBadge {
    let grade = PostureGrade::from_score(score);
    ScoreBadge {
        center: (f64::from(frame.width) - BADGE_RIGHT_INSET, BADGE_TOP),
        width: BADGE_WIDTH,
        height: BADGE_HEIGHT,
        text: format!("{}%", score.round()),
        label: grade.label().to_string(),
        color: grade.color().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{compute_ratios, compute_score, tests::pose};

    const FRAME: FrameSize = FrameSize {
        width: 1280,
        height: 720,
    };

    #[test]
    fn test_full_overlay_for_level_pose() {
        let landmarks = pose([(0.3, 0.4), (0.7, 0.4)], [(0.3, 0.6), (0.7, 0.6)]);
        let ratios = compute_ratios(&landmarks);
        let score = compute_score(Some(&ratios));

        let overlay = build_overlay(&landmarks, Some(&ratios), score, FRAME);

        assert_eq!(overlay.skeleton.len(), SKELETON_CONNECTIONS.len());
        assert_eq!(overlay.landmarks.len(), LandmarkIndex::COUNT);
        assert_eq!(overlay.guides.len(), 2);
        assert_eq!(overlay.markers.len(), 4);

        let eye_line = &overlay.guides[0];
        assert_eq!(eye_line.color, EYE_LINE_COLOR);
        assert!((eye_line.from.0 - 384.0).abs() < 1e-9);
        assert!((eye_line.from.1 - 288.0).abs() < 1e-9);

        let badge = overlay.badge.unwrap();
        assert_eq!(badge.text, "100%");
        assert_eq!(badge.label, "Excellent!");
        assert_eq!(badge.center, (1160.0, 80.0));
    }

    #[test]
    fn test_low_visibility_landmarks_are_skipped() {
        let mut landmarks = pose([(0.3, 0.4), (0.7, 0.4)], [(0.3, 0.6), (0.7, 0.6)]);
        landmarks[LandmarkIndex::LeftElbow.as_usize()].visibility = 0.3;

        let overlay = build_overlay(&landmarks, None, 0.0, FRAME);

        // Both left-arm segments touch the hidden elbow.
        assert_eq!(overlay.skeleton.len(), SKELETON_CONNECTIONS.len() - 2);
        assert_eq!(overlay.landmarks.len(), LandmarkIndex::COUNT - 1);
    }

    #[test]
    fn test_without_ratios_only_skeleton_is_drawn() {
        let landmarks = pose([(0.3, 0.4), (0.7, 0.4)], [(0.3, 0.6), (0.7, 0.6)]);
        let overlay = build_overlay(&landmarks, None, 100.0, FRAME);

        assert!(overlay.guides.is_empty());
        assert!(overlay.markers.is_empty());
        assert!(overlay.badge.is_none());
    }

    #[test]
    fn test_short_landmark_list_does_not_panic() {
        let landmarks = vec![Landmark::new(0.5, 0.5, 1.0); 12];
        let overlay = build_overlay(&landmarks, None, 0.0, FRAME);

        // Every connection needs an index of 12 or above.
        assert!(overlay.skeleton.is_empty());
        assert_eq!(overlay.landmarks.len(), 12);
    }

    #[test]
    fn test_badge_rounding_and_grade() {
        let badge = score_badge(77.5, FRAME);
        assert_eq!(badge.text, "78%");
        assert_eq!(badge.label, "Good");
        assert_eq!(badge.color, "#ffaa00");

        let badge = score_badge(12.2, FRAME);
        assert_eq!(badge.text, "12%");
        assert_eq!(badge.label, "Needs Improvement");
    }
}
