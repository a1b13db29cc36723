use lambda_http::http::StatusCode;
use thiserror::Error;

use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("no image data")]
    Empty,
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image {width}x{height} is too wide for a thumbnail")]
    TooWide { width: u32, height: u32 },
    #[error("failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("no labels stored for image {0}")]
    NotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("label detection failed: {0}")]
    Vision(String),
    #[error("table operation failed: {0}")]
    Table(String),
    #[error("object storage operation failed: {0}")]
    Storage(String),
    #[error(transparent)]
    Thumbnail(#[from] ThumbnailError),
    #[error("delete incomplete: {}", .0.join("; "))]
    Delete(Vec<String>),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Thumbnail(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Vision(_) | ServiceError::Table(_) | ServiceError::Storage(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Config(_) | ServiceError::Delete(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable name, used as the `error` field of responses
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "InvalidRequest",
            ServiceError::Unauthorized(_) => "Unauthorized",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::Config(_) => "ConfigurationMissing",
            ServiceError::Vision(_) => "VisionServiceError",
            ServiceError::Table(_) => "TableError",
            ServiceError::Storage(_) => "StorageError",
            ServiceError::Thumbnail(_) => "ThumbnailError",
            ServiceError::Delete(_) => "DeleteError",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}
