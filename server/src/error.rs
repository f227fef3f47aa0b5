use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;

/// Error returned by handlers. Every variant renders as
/// `{"error": "<message>"}` with the matching status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("you are not allowed to do that")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::RecordNotFound { table, id } => {
                AppError::NotFound(format!("{} {id} not found", singular(&table)))
            }
            DbError::NotNull { .. } | DbError::TypeMismatch { .. } | DbError::UnknownColumn { .. } => {
                AppError::Validation(err.to_string())
            }
            DbError::NoSuchTable(_) | DbError::Decode(_) | DbError::Migration(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::debug!("request rejected with {status}: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn singular(table: &str) -> &str {
    match table {
        "inquiries" => "inquiry",
        other => other.strip_suffix('s').unwrap_or(other),
    }
}
