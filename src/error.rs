use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::controllers::ApiResponse;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            _ => StorageError::Database(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("too many people")]
    TooManyPeople,
    #[error("reservation impossible")]
    ReservationImpossible,
    #[error("cinema is busy")]
    CinemaBusy,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("request timed out")]
    RequestTimeout,
    /// Request body or query string that axum could not extract.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("unexpected db error")]
    UnexpectedStorage(#[source] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::TooManyPeople
            | AppError::ReservationImpossible => StatusCode::BAD_REQUEST,
            AppError::CinemaBusy => StatusCode::CONFLICT,
            AppError::ReservationNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Rejected { status, .. } => *status,
            AppError::UnexpectedStorage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(constraint) => {
                tracing::debug!(constraint = %constraint, "slot binding conflict");
                AppError::CinemaBusy
            }
            StorageError::Database(e) => AppError::UnexpectedStorage(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::UnexpectedStorage(ref cause) = self {
            tracing::error!(error = ?cause, "unexpected storage error");
        }
        let status = self.status_code();
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
