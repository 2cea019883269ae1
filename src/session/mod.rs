//! Per-session frame processing.
//!
//! A [`MonitorSession`] owns the state of one monitoring run. Frames are
//! handled one at a time in arrival order; once the session is stopped,
//! further frames are ignored.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::{Landmark, PostureGrade, PostureRatios};
use crate::overlay::{build_overlay, FrameSize, Overlay};
use crate::scoring::{compute_score, grade, try_compute_ratios};

/// Output of the pose model for one video frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// `None` when the model found no person in the frame
    pub landmarks: Option<Vec<Landmark>>,
}

impl Frame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Some(landmarks),
        }
    }

    pub fn empty() -> Self {
        Self { landmarks: None }
    }
}

/// Scoring result for one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAnalysis {
    /// Sequence number of the frame within the session, starting at 1
    pub sequence: u64,
    pub ratios: PostureRatios,
    pub score: f64,
    pub grade: PostureGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

/// State of one monitoring run.
#[derive(Debug, Default)]
pub struct MonitorSession {
    running: bool,
    frame_size: Option<FrameSize>,
    frames_received: u64,
    current_landmarks: Option<Vec<Landmark>>,
    last_analysis: Option<FrameAnalysis>,
}

impl MonitorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overlays for every analysed frame at this size.
    pub fn with_frame_size(mut self, frame: FrameSize) -> Self {
        self.frame_size = Some(frame);
        self
    }

    pub fn start(&mut self) {
        if !self.running {
            tracing::info!("Posture monitoring started");
        }
        self.running = true;
    }

    /// Stop accepting frames and drop per-run state.
    pub fn stop(&mut self) {
        if self.running {
            tracing::info!(
                "Posture monitoring stopped after {} frames",
                self.frames_received
            );
        }
        self.running = false;
        self.current_landmarks = None;
        self.last_analysis = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn current_landmarks(&self) -> Option<&[Landmark]> {
        self.current_landmarks.as_deref()
    }

    pub fn last_analysis(&self) -> Option<&FrameAnalysis> {
        self.last_analysis.as_ref()
    }

    /// Handle one frame.
    ///
    /// Returns `None` while stopped, when the frame has no person, or when
    /// the landmark set lacks the eye and shoulder entries.
    pub fn process_frame(&mut self, frame: Frame) -> Option<FrameAnalysis> {
        if !self.running {
            return None;
        }
        self.frames_received += 1;

        let landmarks = frame.landmarks.filter(|l| !l.is_empty())?;
        let ratios = match try_compute_ratios(&landmarks) {
            Some(ratios) => ratios,
            None => {
                tracing::debug!(
                    "Frame {} has only {} landmarks; skipping",
                    self.frames_received,
                    landmarks.len()
                );
                self.current_landmarks = Some(landmarks);
                return None;
            }
        };

        let score = compute_score(Some(&ratios));
        let overlay = self
            .frame_size
            .map(|size| build_overlay(&landmarks, Some(&ratios), score, size));

        let analysis = FrameAnalysis {
            sequence: self.frames_received,
            ratios,
            score,
            grade: grade(score),
            overlay,
        };

        self.current_landmarks = Some(landmarks);
        self.last_analysis = Some(analysis.clone());
        Some(analysis)
    }
}

/// Drive a session from a frame channel.
///
/// Frames are processed strictly in the order they are received. The loop
/// ends when the frame sender is dropped or the analysis receiver goes away,
/// and hands the session back to the caller.
pub async fn run_frame_loop(
    mut session: MonitorSession,
    mut frames: mpsc::Receiver<Frame>,
    analyses: mpsc::Sender<FrameAnalysis>,
) -> MonitorSession {
    session.start();

    while let Some(frame) = frames.recv().await {
        if let Some(analysis) = session.process_frame(frame) {
            if analyses.send(analysis).await.is_err() {
                tracing::debug!("Analysis receiver dropped; ending frame loop");
                break;
            }
        }
    }

    session.stop();
    session
}
