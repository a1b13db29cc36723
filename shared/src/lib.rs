pub mod types;
pub mod config;
pub mod error;
pub mod keys;
pub mod rekognition;
pub mod labels;
pub mod s3;
pub mod image_processing;
pub mod ingest;
pub mod service;
pub mod memory;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

use config::AppConfig;
use labels::{DynamoLabelStore, LabelStore};
use rekognition::{LabelDetector, RekognitionDetector};
use s3::{ObjectStore, S3ObjectStore};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub detector: Arc<dyn LabelDetector>,
    pub labels: Arc<dyn LabelStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        detector: Arc<dyn LabelDetector>,
        labels: Arc<dyn LabelStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            detector,
            labels,
            objects,
        })
    }

    /// Wire the AWS-backed services; clients are created once per cold start
    pub fn from_aws(config: AppConfig, sdk_config: &SdkConfig) -> Arc<Self> {
        let label_store = DynamoLabelStore::new(DynamoClient::new(sdk_config), &config.table_name);

        Self::new(
            config,
            Arc::new(RekognitionDetector::new(RekognitionClient::new(sdk_config))),
            Arc::new(label_store),
            Arc::new(S3ObjectStore::new(S3Client::new(sdk_config))),
        )
    }
}
