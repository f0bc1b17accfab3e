use thiserror::Error;

use super::kind::AttachmentKind;

/// Default per-attachment size ceiling (5 MiB).
pub const DEFAULT_MAX_ATTACHMENT_SIZE: u64 = 5 * 1024 * 1024;

/// Reasons an attachment is rejected before any byte is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{file_name}' is not an accepted {kind} file (allowed: {allowed})")]
    InvalidFileType {
        file_name: String,
        kind: AttachmentKind,
        allowed: String,
    },
    #[error("file is too large ({actual} bytes, maximum is {limit} bytes)")]
    FileTooLarge { actual: u64, limit: u64 },
    #[error("'{file_name}' is empty")]
    EmptyFile { file_name: String },
}

/// An attachment that passed validation, carrying the normalized extension
/// the store will use in its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAttachment {
    kind: AttachmentKind,
    extension: String,
    size: u64,
}

impl ValidatedAttachment {
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Pure type/size gate for incoming files. Never touches storage.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentValidator {
    max_size: u64,
}

impl Default for AttachmentValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTACHMENT_SIZE)
    }
}

impl AttachmentValidator {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn validate(
        &self,
        file_name: &str,
        size: u64,
        kind: AttachmentKind,
    ) -> Result<ValidatedAttachment, ValidationError> {
        let extension = file_extension(file_name)
            .filter(|ext| kind.allows(ext))
            .ok_or_else(|| ValidationError::InvalidFileType {
                file_name: file_name.to_string(),
                kind,
                allowed: kind.allowed_extensions().join(", "),
            })?;

        if size > self.max_size {
            return Err(ValidationError::FileTooLarge {
                actual: size,
                limit: self.max_size,
            });
        }
        if size == 0 {
            return Err(ValidationError::EmptyFile {
                file_name: file_name.to_string(),
            });
        }

        Ok(ValidatedAttachment {
            kind,
            extension,
            size,
        })
    }
}

/// Lowercased text after the final `.`, or `None` when there is no usable extension.
fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
