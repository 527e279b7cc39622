// src/error.rs

use crate::domain::calendar::CalendarError;
use crate::repository::StoreError;
use crate::utils::password::PasswordError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid UUID: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// レコードストアの操作失敗。ストアが返した理由を保持する。
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::OperationFailed(reason) => AppError::OperationFailed(reason),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::WeakPassword(message) => AppError::ValidationError(message),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

/// エラー時のレスポンスボディ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// フィールド名ごとのメッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, Vec<String>>>,
    /// `{"message": "field: message"}` の平坦な一覧
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}

impl ErrorResponse {
    fn new(error_type: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            error: message.clone(),
            message,
            details: None,
            validation_errors: None,
            errors: None,
            error_type: error_type.to_string(),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn from_validation(errors: &ValidationErrors) -> Self {
        let by_field: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_deref()
                            .unwrap_or("Invalid value")
                            .to_string()
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        let flat = by_field
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |m| json!({ "message": format!("{}: {}", field, m) }))
            })
            .collect();

        Self {
            validation_errors: Some(by_field),
            errors: Some(flat),
            ..Self::new("validation_errors", "Validation failed")
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::ValidationFailure(_)
            | AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DbErr(_) | AppError::OperationFailed(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::DbErr(db_err) => {
                tracing::error!(error = ?db_err, "Database error");
                match db_err {
                    DbErr::RecordNotFound(entity) => {
                        ErrorResponse::new("database_error", "The requested resource was not found")
                            .with_details(json!({ "entity": entity }))
                    }
                    DbErr::Exec(_) | DbErr::Query(_) => {
                        ErrorResponse::new("database_error", "A database operation failed")
                    }
                    _ => ErrorResponse::new("database_error", "A database error occurred"),
                }
            }
            AppError::ValidationFailure(errors) => ErrorResponse::from_validation(errors),
            AppError::ValidationError(message) => {
                ErrorResponse::new("validation_error", message.as_str())
            }
            AppError::UuidError(err) => {
                ErrorResponse::new("invalid_uuid", format!("Invalid UUID: {}", err))
            }
            AppError::BadRequest(message) => ErrorResponse::new("bad_request", message.as_str()),
            AppError::Unauthorized(message) => ErrorResponse::new("unauthorized", message.as_str()),
            AppError::Forbidden(message) => ErrorResponse::new("forbidden", message.as_str()),
            AppError::NotFound(message) => ErrorResponse::new("not_found", message.as_str()),
            AppError::Conflict(message) => ErrorResponse::new("conflict", message.as_str()),
            AppError::OperationFailed(reason) => {
                tracing::error!(store_message = %reason, "Record store operation failed");
                ErrorResponse::new("operation_failed", "Operation failed")
                    .with_details(json!({ "reason": reason }))
            }
            AppError::InternalServerError(message) => {
                // 内部の詳細はログにだけ残す
                tracing::error!(error = %message, "Internal server error");
                ErrorResponse::new("internal_server_error", "An internal server error occurred")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_error_response())).into_response()
    }
}
