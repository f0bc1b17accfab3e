use axum::body::Bytes;

/// A file part received with a submission, before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl IncomingFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Everything one submission carries, scoped to a single call of
/// [`SubmissionService::submit`](super::SubmissionService::submit).
///
/// The pending coordinate and media live here rather than in shared state, so
/// consuming the context is what clears them.
#[derive(Debug, Clone, Default)]
pub struct SubmissionContext {
    pub title: String,
    pub description: String,
    pub category: String,
    pub language: Option<String>,
    pub place_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<IncomingFile>,
    pub audio: Option<IncomingFile>,
    pub video: Option<IncomingFile>,
    pub document: Option<IncomingFile>,
}
