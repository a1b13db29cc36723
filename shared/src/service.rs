use std::collections::HashMap;

use crate::error::ServiceError;
use crate::keys::normalize_key;
use crate::types::{Action, DeleteOutput, LabelsOutput, ServiceRequest};
use crate::AppState;

pub const DELETE_RESULT: &str = "Delete request successfully processed";

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutput {
    Labels(LabelsOutput),
    Deleted(DeleteOutput),
}

impl ServiceRequest {
    /// Decode a request from a JSON body, or from `action`/`key` query
    /// parameters when the body is empty.
    pub fn decode(body: &[u8], query: &HashMap<String, String>) -> Result<Self, ServiceError> {
        let request = if body.iter().all(u8::is_ascii_whitespace) {
            let action = query
                .get("action")
                .ok_or_else(|| ServiceError::BadRequest("missing action".to_string()))?;
            let key = query
                .get("key")
                .ok_or_else(|| ServiceError::BadRequest("missing key".to_string()))?;
            let action: Action = serde_json::from_value(serde_json::Value::String(action.clone()))
                .map_err(|_| ServiceError::BadRequest(format!("unknown action {}", action)))?;
            ServiceRequest {
                action,
                key: key.clone(),
            }
        } else {
            serde_json::from_slice(body)
                .map_err(|e| ServiceError::BadRequest(format!("Invalid request body: {}", e)))?
        };

        if request.key.trim().is_empty() {
            return Err(ServiceError::BadRequest("key must not be empty".to_string()));
        }
        Ok(request)
    }
}

/// Dispatch a decoded request
pub async fn handle(state: &AppState, request: &ServiceRequest) -> Result<ServiceOutput, ServiceError> {
    match request.action {
        Action::GetLabels => get_labels(state, &request.key)
            .await
            .map(ServiceOutput::Labels),
        Action::DeleteImage => delete_image(state, &request.key)
            .await
            .map(ServiceOutput::Deleted),
    }
}

/// Labels stored for `key`; a missing record is `NotFound`, never an empty list
pub async fn get_labels(state: &AppState, key: &str) -> Result<LabelsOutput, ServiceError> {
    let key = normalize_key(key);
    tracing::info!("Fetching labels for {}", key);

    match state.labels.get_labels(&key).await? {
        Some(record) => Ok(LabelsOutput {
            labels: record.labels,
        }),
        None => Err(ServiceError::NotFound(key)),
    }
}

/// Delete the record, the source object and the thumbnail. Every step runs even
/// when an earlier one fails; failures are reported together.
pub async fn delete_image(state: &AppState, key: &str) -> Result<DeleteOutput, ServiceError> {
    let key = normalize_key(key);
    let config = &state.config;
    tracing::info!("Deleting {} from table and buckets", key);

    let mut failures = Vec::new();

    if let Err(e) = state.labels.delete_labels(&key).await {
        tracing::error!("Failed to delete label record {}: {}", key, e);
        failures.push(format!("table {}: {}", config.table_name, e));
    }

    for bucket in [&config.bucket_name, &config.thumbnail_bucket_name] {
        if let Err(e) = state.objects.delete_object(bucket, &key).await {
            tracing::error!("Failed to delete s3://{}/{}: {}", bucket, key, e);
            failures.push(format!("bucket {}: {}", bucket, e));
        }
    }

    if !failures.is_empty() {
        return Err(ServiceError::Delete(failures));
    }

    Ok(DeleteOutput {
        result: DELETE_RESULT.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::labels::LabelStore;
    use crate::memory::{MemoryLabelStore, MemoryObjectStore, StaticDetector};
    use crate::types::LabeledImage;
    use std::sync::Arc;

    fn state_with(
        labels: Arc<MemoryLabelStore>,
        objects: Arc<MemoryObjectStore>,
    ) -> Arc<AppState> {
        AppState::new(
            AppConfig::new("ImageLabels", "images", "thumbnails"),
            Arc::new(StaticDetector::default()),
            labels,
            objects,
        )
    }

    #[test]
    fn test_decode_json_body() {
        let request = ServiceRequest::decode(
            br#"{"action":"deleteImage","key":"a.jpg"}"#,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(request.action, Action::DeleteImage);
        assert_eq!(request.key, "a.jpg");
    }

    #[test]
    fn test_decode_query_parameters() {
        let query = HashMap::from([
            ("action".to_string(), "getLabels".to_string()),
            ("key".to_string(), "b.png".to_string()),
        ]);
        let request = ServiceRequest::decode(b"", &query).unwrap();
        assert_eq!(request.action, Action::GetLabels);
        assert_eq!(request.key, "b.png");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let empty = HashMap::new();
        for body in [
            &br#"{"action":"rename","key":"a.jpg"}"#[..],
            &br#"{"action":"getLabels"}"#[..],
            &br#"{"action":"getLabels","key":"  "}"#[..],
            &b"not json"[..],
            &b""[..],
        ] {
            let err = ServiceRequest::decode(body, &empty).unwrap_err();
            assert!(matches!(err, ServiceError::BadRequest(_)), "body {:?}", body);
        }
    }

    #[tokio::test]
    async fn test_get_labels_returns_stored_order() {
        let labels = Arc::new(MemoryLabelStore::new());
        let state = state_with(labels.clone(), Arc::new(MemoryObjectStore::new()));
        labels
            .put_labels(&LabeledImage {
                image: "folder/photo:1.jpg".to_string(),
                labels: vec!["cat".to_string(), "animal".to_string()],
            })
            .await
            .unwrap();

        // escaped keys resolve to the same record
        let output = get_labels(&state, "folder/photo%3A1.jpg").await.unwrap();
        assert_eq!(output.labels, vec!["cat", "animal"]);
    }

    #[tokio::test]
    async fn test_get_labels_missing_is_not_found() {
        let state = state_with(
            Arc::new(MemoryLabelStore::new()),
            Arc::new(MemoryObjectStore::new()),
        );
        let err = get_labels(&state, "nothing.jpg").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(key) if key == "nothing.jpg"));
    }

    #[tokio::test]
    async fn test_delete_missing_image_succeeds_and_touches_everything() {
        let labels = Arc::new(MemoryLabelStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        let state = state_with(labels.clone(), objects.clone());

        let request = ServiceRequest {
            action: Action::DeleteImage,
            key: "ghost.jpg".to_string(),
        };
        let output = handle(&state, &request).await.unwrap();

        assert_eq!(
            output,
            ServiceOutput::Deleted(DeleteOutput {
                result: DELETE_RESULT.to_string()
            })
        );
        assert_eq!(labels.deleted(), vec!["ghost.jpg"]);
        assert_eq!(
            objects.deleted(),
            vec![
                ("images".to_string(), "ghost.jpg".to_string()),
                ("thumbnails".to_string(), "ghost.jpg".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_objects() {
        let labels = Arc::new(MemoryLabelStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        let state = state_with(labels.clone(), objects.clone());
        labels
            .put_labels(&LabeledImage {
                image: "cat.jpg".to_string(),
                labels: vec!["cat".to_string()],
            })
            .await
            .unwrap();
        objects.insert("images", "cat.jpg", vec![1, 2, 3]);
        objects.insert("thumbnails", "cat.jpg", vec![4]);

        delete_image(&state, "cat.jpg").await.unwrap();

        assert!(labels.record("cat.jpg").is_none());
        assert!(objects.object("images", "cat.jpg").is_none());
        assert!(objects.object("thumbnails", "cat.jpg").is_none());
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported_after_all_steps() {
        let labels = Arc::new(MemoryLabelStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        objects.fail_bucket("images");
        let state = state_with(labels.clone(), objects.clone());

        let err = delete_image(&state, "cat.jpg").await.unwrap_err();

        match err {
            ServiceError::Delete(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].starts_with("bucket images"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        // the thumbnail delete still ran
        assert_eq!(objects.deleted().len(), 2);
        assert_eq!(labels.deleted(), vec!["cat.jpg"]);
    }
}
