use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::ingest::IngestError;
use crate::services::validator::ValidationError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Unable to marshal JSON")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Ingest(e) => match e {
                IngestError::TooLarge(_) | IngestError::BadRequest(_) => StatusCode::BAD_REQUEST,
                IngestError::StorageUnavailable(cause) => {
                    tracing::error!("Storage error: {cause}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
