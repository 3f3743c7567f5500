use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::export::ExportError;
use super::store::StoreError;

/// Failure kinds surfaced by every marketplace operation.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("you have already applied to this job")]
    DuplicateApplication,
    #[error("job already saved")]
    AlreadySaved,
    #[error("invalid application status '{0}'")]
    InvalidStatus(String),
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl MarketplaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateApplication
            | Self::AlreadySaved
            | Self::InvalidStatus(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Upload(_) => StatusCode::BAD_GATEWAY,
            Self::Export(err) => err.status_code(),
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for MarketplaceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound("record"),
            other => Self::Persistence(other),
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "marketplace request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
