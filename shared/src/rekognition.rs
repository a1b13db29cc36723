use async_trait::async_trait;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_rekognition::Client as RekognitionClient;

use crate::error::ServiceError;
use crate::types::{DetectedLabel, MAX_LABELS, MIN_CONFIDENCE};

/// Label detection against an image already stored in a bucket
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, bucket: &str, key: &str)
        -> Result<Vec<DetectedLabel>, ServiceError>;
}

pub struct RekognitionDetector {
    client: RekognitionClient,
}

impl RekognitionDetector {
    pub fn new(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LabelDetector for RekognitionDetector {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<DetectedLabel>, ServiceError> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(MAX_LABELS as i32)
            .min_confidence(MIN_CONFIDENCE)
            .send()
            .await
            .map_err(|e| ServiceError::Vision(format!("DetectLabels on {}/{}: {}", bucket, key, e)))?;

        Ok(output
            .labels()
            .iter()
            .filter_map(|label| {
                let name = label.name()?;
                Some(DetectedLabel::new(name, label.confidence().unwrap_or(0.0)))
            })
            .collect())
    }
}

/// Keep the names of labels at or above the confidence floor, in service
/// order, capped at `MAX_LABELS`.
pub fn filter_labels(detected: Vec<DetectedLabel>) -> Vec<String> {
    detected
        .into_iter()
        .filter(|label| label.confidence >= MIN_CONFIDENCE && !label.name.trim().is_empty())
        .map(|label| label.name)
        .take(MAX_LABELS)
        .collect()
}
