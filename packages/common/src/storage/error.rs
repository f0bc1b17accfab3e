use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during attachment storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No attachment is stored under the reference.
    #[error("attachment not found: {0}")]
    NotFound(String),
    /// The string is not a well-formed attachment reference.
    #[error("invalid attachment reference: {0}")]
    InvalidRef(String),
    /// A file already exists under a freshly generated reference.
    #[error("attachment already exists: {0}")]
    Collision(String),
    /// The write did not complete within the configured deadline.
    #[error("attachment write timed out after {0:?}")]
    Timeout(Duration),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
