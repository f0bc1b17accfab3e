use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::gateway::AttachmentBody;
use crate::state::AppState;

/// References never point at different bytes, so responses are cacheable forever.
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

#[utoipa::path(
    get,
    path = "/{attachment_ref}",
    tag = "Attachments",
    operation_id = "downloadAttachment",
    summary = "Download an attachment",
    description = "Streams the bytes behind an attachment reference. The reference doubles as \
        the ETag; a matching `If-None-Match` returns 304. Unknown and malformed references \
        return 404.",
    params(("attachment_ref" = String, Path, description = "Attachment reference, e.g. `image_<hex>.jpg`")),
    responses(
        (status = 200, description = "Attachment bytes", content_type = "application/octet-stream"),
        (status = 304, description = "Not modified"),
        (status = 404, description = "Attachment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(attachment_ref): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let etag_value = format!("\"{attachment_ref}\"");
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && val.split(',').map(str::trim).any(|tag| tag == etag_value)
    {
        // Only known references are ever handed out, but check before answering 304.
        if state.gateway().has_attachment(&attachment_ref).await? {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    let attachment = state.gateway().get_attachment(&attachment_ref).await?;
    build_attachment_response(attachment, &etag_value)
}

fn build_attachment_response(
    attachment: AttachmentBody,
    etag_value: &str,
) -> Result<Response, AppError> {
    let body = Body::from_stream(ReaderStream::new(attachment.reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.content_type)
        .header(header::CONTENT_LENGTH, attachment.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", attachment.reference),
        )
        .header(header::ETAG, etag_value)
        .header(header::CACHE_CONTROL, IMMUTABLE_CACHE)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
