//! Submission ingestion: one end-to-end submission as a single logical unit.

mod context;
mod error;
mod service;

pub use context::{IncomingFile, SubmissionContext};
pub use error::SubmissionError;
pub use service::{
    DESCRIPTION_MAX_CHARS, PLACE_NAME_MAX_CHARS, SubmissionService, TITLE_MAX_CHARS,
};
