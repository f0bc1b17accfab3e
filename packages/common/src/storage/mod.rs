mod error;
mod kind;
mod reference;
mod traits;
mod validation;

pub mod filesystem;

pub use error::StorageError;
pub use kind::AttachmentKind;
pub use reference::AttachmentRef;
pub use traits::{AttachmentStore, BoxReader};
pub use validation::{
    AttachmentValidator, DEFAULT_MAX_ATTACHMENT_SIZE, ValidatedAttachment, ValidationError,
};
