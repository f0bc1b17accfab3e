use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::{StorageError, ValidationError};
use sea_orm::DbErr;
use serde::Serialize;

use crate::submission::SubmissionError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_FILE_TYPE`,
    /// `FILE_TOO_LARGE`, `LOCATION_REQUIRED`, `NOT_FOUND`, `STORAGE_WRITE_ERROR`,
    /// `PERSISTENCE_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must be 1-100 characters")]
    pub message: String,
    /// Offending form field, when the error concerns a single field.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "title")]
    pub field: Option<&'static str>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    InvalidFileType {
        field: &'static str,
        message: String,
    },
    FileTooLarge {
        field: &'static str,
        actual: u64,
        limit: u64,
    },
    /// The request body hit its size ceiling before the form was read.
    BodyTooLarge {
        limit: u64,
    },
    LocationRequired,
    NotFound(String),
    StorageWrite(String),
    Persistence(String),
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message,
                    field,
                },
            ),
            AppError::InvalidFileType { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_FILE_TYPE",
                    message,
                    field: Some(field),
                },
            ),
            AppError::FileTooLarge {
                field,
                actual,
                limit,
            } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "FILE_TOO_LARGE",
                    message: format!(
                        "File exceeds the maximum allowed size of {limit} bytes \
                         ({actual} bytes received)"
                    ),
                    field: Some(field),
                },
            ),
            AppError::BodyTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "FILE_TOO_LARGE",
                    message: format!("Request body exceeds {limit} bytes"),
                    field: None,
                },
            ),
            AppError::LocationRequired => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "LOCATION_REQUIRED",
                    message: "A latitude and longitude are required; allow location access and retry"
                        .into(),
                    field: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                    field: None,
                },
            ),
            AppError::StorageWrite(detail) => {
                tracing::error!("Attachment write failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "STORAGE_WRITE_ERROR",
                        message: "Failed to store attachment; please retry".into(),
                        field: None,
                    },
                )
            }
            AppError::Persistence(detail) => {
                tracing::error!("Catalog persistence failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "PERSISTENCE_ERROR",
                        message: "Failed to save the site record; please retry".into(),
                        field: None,
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                        field: None,
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) | StorageError::InvalidRef(_) => {
                AppError::NotFound("Attachment not found".into())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation { field, message } => AppError::Validation {
                field: Some(field),
                message,
            },
            SubmissionError::Attachment { field, source } => match source {
                ValidationError::FileTooLarge { actual, limit } => AppError::FileTooLarge {
                    field,
                    actual,
                    limit,
                },
                ValidationError::InvalidFileType { .. } => AppError::InvalidFileType {
                    field,
                    message: source.to_string(),
                },
                ValidationError::EmptyFile { .. } => AppError::Validation {
                    field: Some(field),
                    message: source.to_string(),
                },
            },
            SubmissionError::LocationRequired => AppError::LocationRequired,
            SubmissionError::StorageWrite { field, source } => {
                AppError::StorageWrite(format!("{field}: {source}"))
            }
            SubmissionError::Persistence(e) => AppError::Persistence(e.to_string()),
        }
    }
}
