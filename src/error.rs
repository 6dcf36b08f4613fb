// Error kinds surfaced by the image cache, the todo store and the HTTP layer.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Retrieving or persisting the cached image failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("image source unavailable: {0}")]
    Unavailable(String),

    #[error("concurrent refresh failed: {0}")]
    Shared(String),

    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A todo submitted by a client was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("todo text exceeds maximum length of {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("malformed request body: {0}")]
    Malformed(String),
}

/// The database rejected or failed an operation.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(#[from] pub sqlx::Error);

/// Error returned from an HTTP handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to read cached image: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Fetch(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {:#}", self);
        } else {
            debug!("request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
