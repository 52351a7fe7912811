use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::generation::client::GenerationError;
use crate::share::ShareError;
use crate::store::StoreError;

/// Every failure a handler can surface. Rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Duplicate(String),

    #[error("this share link is corrupted or incomplete")]
    CorruptedShareLink,

    /// The rating ledger kept losing races; the caller may try again.
    #[error("could not save your review right now, please try again")]
    RetriesExhausted,

    #[error(transparent)]
    Upstream(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("object storage error: {0}")]
    ObjectStorage(anyhow::Error),
}

impl From<ShareError> for AppError {
    fn from(_: ShareError) -> Self {
        AppError::CorruptedShareLink
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::CorruptedShareLink => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::RetriesExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(GenerationError::Overloaded) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::ObjectStorage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Store(_) | AppError::ObjectStorage(_) => {
                error!(error = %self, "internal error");
                "internal server error".to_string()
            }
            AppError::Upstream(e) => {
                error!(error = %e, "generation service failed");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
