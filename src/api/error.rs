use crate::services::storage::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body text of the skeleton API's catch-all 404, kept byte-for-byte (double space included).
pub const NOT_FOUND_MESSAGE: &str = "Not Found -  Error 404.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn route_not_found() -> Self {
        AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
    }
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Rejected { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // The store's error object is forwarded as-is
            AppError::Store(e) => return (e.status_code(), Json(e)).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
