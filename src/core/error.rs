use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    MissingFields(String),

    #[error("invalid time format")]
    InvalidTime,

    #[error("cannot create appointment in the past")]
    InThePast,

    #[error("appointments can be booked only between 08:00 and 16:00")]
    OutOfHours,

    #[error("appointments must start at a valid time for this service")]
    MisalignedSlot,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("past appointments cannot be modified")]
    PastLocked,

    #[error("appointments cannot be cancelled less than 24 hours before they start")]
    TooSoon,

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("this time slot is already booked")]
    SlotTaken,

    #[error("edit request already pending")]
    EditPending,

    #[error("no pending edit request")]
    NoPendingRequest,

    #[error("cannot delete category with existing services")]
    CategoryInUse,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_)
            | AppError::InvalidTime
            | AppError::InThePast
            | AppError::OutOfHours
            | AppError::MisalignedSlot
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PastLocked | AppError::TooSoon | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SlotTaken
            | AppError::EditPending
            | AppError::NoPendingRequest
            | AppError::CategoryInUse => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error occurred".to_string()
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ref other => other.to_string(),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), None));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
