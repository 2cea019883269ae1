//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::present;

/// Body of `POST /api/save-posture`, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SavePostureRequest {
    /// Store a new reference snapshot
    GoodPosture {
        #[serde(default)]
        data: Option<Value>,
    },
    /// Append a scored check to the history
    PostureCheck {
        #[serde(default)]
        current: Option<Value>,
        /// An explicit `null` is kept and stored as `null`
        #[serde(default, deserialize_with = "present")]
        differences: Option<Value>,
        #[serde(default)]
        score: Option<Value>,
        #[serde(default)]
        timestamp: Option<Value>,
    },
}

/// Acknowledgement returned by write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

impl SaveResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
