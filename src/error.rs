use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    /// Status code surfaced in both the HTTP status line and the envelope.
    /// 511 for missing credentials is kept for existing clients.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::NETWORK_AUTHENTICATION_REQUIRED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::Conflict(_) => "conflict",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::InvalidState(_) => "invalid_state",
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => "internal",
        }
    }

    /// Turn a unique-key violation into `Conflict`, anything else stays a storage error.
    pub fn on_unique_violation(err: sea_orm::DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(message.to_string())
            }
            _ => AppError::OrmError(err),
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = ?err, "internal error"),
            _ => {}
        }

        let status = self.status();
        let body = ApiResponse {
            success: false,
            message: self.public_message(),
            data: Some(ErrorData { error: self.code() }),
            status_code: status.as_u16(),
            meta: None,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_do_not_leak_details() {
        let err = AppError::OrmError(sea_orm::DbErr::Custom("relation \"orders\" missing".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn missing_credentials_keep_legacy_status() {
        assert_eq!(AppError::Unauthenticated.status().as_u16(), 511);
        assert_eq!(AppError::InvalidCredentials.status().as_u16(), 401);
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::InsufficientStock("Insufficient stock".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("Coupon code already exists".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::not_found("Order").to_string(), "Order not found");
    }
}
