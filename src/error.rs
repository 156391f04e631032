use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures raised by a `NoteStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Errors a request can end with. All of them are terminal for the request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{resource} {id} does not exist")]
    NotFound { resource: &'static str, id: i64 },

    #[error("The tag '{0}' is invalid")]
    InvalidReference(String),

    #[error("The tag '{0}' does not exist")]
    UnknownTag(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn note_not_found(id: i64) -> Self {
        ApiError::NotFound { resource: "note", id }
    }

    pub fn tag_not_found(id: i64) -> Self {
        ApiError::NotFound { resource: "tag", id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidReference(_) | ApiError::UnknownTag(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(e) => {
                error!(error = %e, "store operation failed");
                "internal storage error".to_string()
            }
            other => {
                warn!(status = status.as_u16(), "request rejected: {other}");
                other.to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
