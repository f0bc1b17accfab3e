use common::storage::{StorageError, ValidationError};
use sea_orm::DbErr;
use thiserror::Error;

/// Why a submission was rejected or failed.
///
/// `Validation`, `Attachment` and `LocationRequired` are raised before any
/// write; `StorageWrite` and `Persistence` happen after attachments may have
/// been written, which the service then removes.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{field}: {source}")]
    Attachment {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("a latitude and longitude are required")]
    LocationRequired,
    #[error("failed to store {field} attachment: {source}")]
    StorageWrite {
        field: &'static str,
        #[source]
        source: StorageError,
    },
    #[error("failed to persist site record: {0}")]
    Persistence(#[from] DbErr),
}

impl SubmissionError {
    pub(crate) fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
