use serde::{Deserialize, Serialize};

/// Maximum number of labels requested from and kept after detection
pub const MAX_LABELS: usize = 10;
/// Confidence floor (percent) a label must reach to be kept
pub const MIN_CONFIDENCE: f32 = 50.0;

// ========== LABELED IMAGE ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabeledImage {
    pub image: String, // object key, also the table partition key
    pub labels: Vec<String>,
}

// ========== DETECTION ==========
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

// ========== NOTIFICATION ==========
/// One "object created" record of the trigger. The key is already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub bucket: String,
    pub key: String,
}

// ========== SERVICE ==========
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetLabels,
    DeleteImage,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceRequest {
    pub action: Action,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabelsOutput {
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeleteOutput {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
