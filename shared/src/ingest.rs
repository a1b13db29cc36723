use aws_lambda_events::event::s3::S3Event;
use futures::future::try_join_all;

use crate::error::ServiceError;
use crate::image_processing;
use crate::keys::normalize_key;
use crate::rekognition::filter_labels;
use crate::types::{LabeledImage, Notification};
use crate::AppState;

/// Turn the records of an S3 event into notifications with normalized keys
pub fn notifications_from_event(event: &S3Event) -> Result<Vec<Notification>, ServiceError> {
    if event.records.is_empty() {
        return Err(ServiceError::BadRequest("event has no records".to_string()));
    }

    event
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| -> Result<Notification, ServiceError> {
            let bucket = record
                .s3
                .bucket
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| ServiceError::BadRequest(format!("record {} has no bucket name", index)))?;
            let key = record
                .s3
                .object
                .key
                .as_deref()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| ServiceError::BadRequest(format!("record {} has no object key", index)))?;

            Ok(Notification {
                bucket: bucket.to_string(),
                key: normalize_key(key),
            })
        })
        .collect()
}

/// Run every notification concurrently. The first failure fails the batch and
/// drops the pipelines still in flight.
pub async fn process_batch(
    state: &AppState,
    notifications: &[Notification],
) -> Result<usize, ServiceError> {
    tracing::info!("Processing batch of {} notifications", notifications.len());

    try_join_all(
        notifications
            .iter()
            .map(|notification| process_notification(state, notification)),
    )
    .await?;

    Ok(notifications.len())
}

/// Detect labels, store the record and publish the thumbnail for one object
pub async fn process_notification(
    state: &AppState,
    notification: &Notification,
) -> Result<(), ServiceError> {
    let Notification { bucket, key } = notification;
    tracing::info!("📷 Processing s3://{}/{}", bucket, key);

    let result = run_pipeline(state, bucket, key).await;
    if let Err(e) = &result {
        tracing::error!("Failed to process s3://{}/{}: {}", bucket, key, e);
    }
    result
}

async fn run_pipeline(state: &AppState, bucket: &str, key: &str) -> Result<(), ServiceError> {
    let image_bytes = state.objects.get_object(bucket, key).await?;
    tracing::info!("Fetched {} bytes for {}", image_bytes.len(), key);

    let detected = state.detector.detect_labels(bucket, key).await?;
    let labels = filter_labels(detected);
    if labels.is_empty() {
        tracing::info!("No labels above the confidence floor for {}, nothing to store", key);
        return Ok(());
    }
    tracing::info!("Detected labels for {}: {:?}", key, labels);

    let thumbnail = image_processing::generate_thumbnail(&image_bytes)?;
    tracing::info!(
        "Generated {}x{} thumbnail for {}",
        thumbnail.width,
        thumbnail.height,
        key
    );

    let record = LabeledImage {
        image: key.to_string(),
        labels,
    };
    state.labels.put_labels(&record).await?;

    state
        .objects
        .put_public_object(
            &state.config.thumbnail_bucket_name,
            key,
            thumbnail.bytes,
            thumbnail.content_type,
        )
        .await?;

    tracing::info!(
        "Stored labels and thumbnail for {} in {}",
        key,
        state.config.thumbnail_bucket_name
    );
    Ok(())
}
