pub mod reservations;

use axum::{
    extract::{FromRequest, FromRequestParts},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;

/// `axum::Json` whose rejection renders the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` whose rejection renders the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub error_message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            error_message: String::new(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            error_message: message.into(),
            data: None,
        }
    }
}

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new().merge(reservations::routes())
}
