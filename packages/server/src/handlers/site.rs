use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{debug, instrument};

use common::storage::AttachmentKind;

use crate::error::{AppError, ErrorBody};
use crate::models::site::*;
use crate::state::AppState;
use crate::submission::{IncomingFile, SubmissionContext};

/// Room for the four attachment slots at their ceiling plus the text fields.
fn submission_body_bytes(max_attachment_size: u64) -> u64 {
    max_attachment_size
        .saturating_mul(4)
        .saturating_add(1024 * 1024)
}

pub fn submission_body_limit(max_attachment_size: u64) -> DefaultBodyLimit {
    let limit = submission_body_bytes(max_attachment_size);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Sites",
    operation_id = "createSite",
    summary = "Submit a heritage site",
    description = "Accepts a multipart form with `title`, `description`, `category`, optional \
        `language` and `place_name`, `latitude`/`longitude`, a mandatory `image` file and optional \
        `audio`, `video` and `document` files. Every field and file is validated before anything \
        is written; on success the attachments are stored and one catalog record is appended.",
    request_body(content_type = "multipart/form-data", description = "Site fields and attachments"),
    responses(
        (status = 201, description = "Site recorded", body = SiteResponse),
        (status = 400, description = "Invalid input (VALIDATION_ERROR, INVALID_FILE_TYPE, LOCATION_REQUIRED)", body = ErrorBody),
        (status = 413, description = "Attachment too large (FILE_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Write failed (STORAGE_WRITE_ERROR, PERSISTENCE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_site(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let ctx = read_submission_form(multipart, state.config.storage.max_attachment_size).await?;
    let model = state.submissions().submit(ctx).await?;

    Ok((StatusCode::CREATED, Json(SiteResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Sites",
    operation_id = "listSites",
    summary = "List catalog records",
    description = "Returns one page of records, newest first. `search` matches the title OR the \
        category case-insensitively. Pages outside the existing range are clamped to the nearest \
        existing page.",
    params(SiteListQuery),
    responses(
        (status = 200, description = "One page of records", body = SiteListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_sites(
    State(state): State<AppState>,
    Query(query): Query<SiteListQuery>,
) -> Result<Json<SiteListResponse>, AppError> {
    let page = state.gateway().get_records(query.search, query.page).await?;

    Ok(Json(SiteListResponse {
        data: page.records.into_iter().map(SiteResponse::from).collect(),
        pagination: page.pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Sites",
    operation_id = "listAllSites",
    summary = "List every catalog record",
    responses(
        (status = 200, description = "All records, newest first", body = SiteCollectionResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_all_sites(
    State(state): State<AppState>,
) -> Result<Json<SiteCollectionResponse>, AppError> {
    let records = state.gateway().get_all_records().await?;
    let total = records.len() as u64;

    Ok(Json(SiteCollectionResponse {
        data: records.into_iter().map(SiteResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/map",
    tag = "Sites",
    operation_id = "listMapPoints",
    summary = "List map markers",
    description = "Returns every record that has both a latitude and a longitude.",
    responses(
        (status = 200, description = "Map markers", body = MapPointsResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn map_points(
    State(state): State<AppState>,
) -> Result<Json<MapPointsResponse>, AppError> {
    let points = state.gateway().map_points().await?;
    let total = points.len() as u64;

    Ok(Json(MapPointsResponse { points, total }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Sites",
    operation_id = "getSite",
    summary = "Get a catalog record",
    params(("id" = i32, Path, description = "Site ID")),
    responses(
        (status = 200, description = "The record", body = SiteResponse),
        (status = 404, description = "Site not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SiteResponse>, AppError> {
    let model = state.gateway().get_record(id).await?;

    Ok(Json(SiteResponse::from(model)))
}

/// Collect the multipart form into a request-scoped submission context.
/// File parts longer than `max_file_bytes` are cut off while streaming.
async fn read_submission_form(
    mut multipart: Multipart,
    max_file_bytes: u64,
) -> Result<SubmissionContext, AppError> {
    let mut ctx = SubmissionContext::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, None, max_file_bytes))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let max = max_file_bytes;
        match name.as_str() {
            "title" => ctx.title = read_text(field, "title", max).await?,
            "description" => ctx.description = read_text(field, "description", max).await?,
            "category" => ctx.category = read_text(field, "category", max).await?,
            "language" => ctx.language = Some(read_text(field, "language", max).await?),
            "place_name" => ctx.place_name = Some(read_text(field, "place_name", max).await?),
            "latitude" => {
                let raw = read_text(field, "latitude", max).await?;
                ctx.latitude = parse_coordinate(&raw, "latitude")?;
            }
            "longitude" => {
                let raw = read_text(field, "longitude", max).await?;
                ctx.longitude = parse_coordinate(&raw, "longitude")?;
            }
            "image" => ctx.image = read_file(field, AttachmentKind::Image, max).await?,
            "audio" => ctx.audio = read_file(field, AttachmentKind::Audio, max).await?,
            "video" => ctx.video = read_file(field, AttachmentKind::Video, max).await?,
            "document" => ctx.document = read_file(field, AttachmentKind::Document, max).await?,
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(ctx)
}

async fn read_text(
    field: Field<'_>,
    name: &'static str,
    max_file_bytes: u64,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| multipart_error(e, Some(name), max_file_bytes))
}

/// A body-limit hit becomes `FILE_TOO_LARGE`; anything else is a malformed form.
fn multipart_error(
    e: MultipartError,
    field: Option<&'static str>,
    max_file_bytes: u64,
) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::BodyTooLarge {
            limit: submission_body_bytes(max_file_bytes),
        };
    }
    match field {
        Some(name) => AppError::field(name, format!("Failed to read {name}: {e}")),
        None => AppError::validation(format!("Multipart error: {e}")),
    }
}

/// Blank means the browser could not capture a location.
fn parse_coordinate(raw: &str, name: &'static str) -> Result<Option<f64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::field(name, format!("{name} must be a number")))
}

/// Read a file part chunk by chunk, giving up as soon as it outgrows
/// `max_file_bytes`. Browsers send an empty, unnamed part when no file was
/// chosen; that is treated as absent.
async fn read_file(
    mut field: Field<'_>,
    kind: AttachmentKind,
    max_file_bytes: u64,
) -> Result<Option<IncomingFile>, AppError> {
    let name = kind.as_str();
    let file_name = field.file_name().map(str::to_owned).unwrap_or_default();
    let content_type = field.content_type().map(str::to_owned);

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, Some(name), max_file_bytes))?
    {
        bytes.extend_from_slice(&chunk);
        if bytes.len() as u64 > max_file_bytes {
            // Keep consuming the part so the client gets to read the response.
            let mut received = bytes.len() as u64;
            while let Ok(Some(chunk)) = field.chunk().await {
                received += chunk.len() as u64;
            }
            debug!(field = name, received, "Upload cut off at the size limit");
            return Err(AppError::FileTooLarge {
                field: name,
                actual: received,
                limit: max_file_bytes,
            });
        }
    }

    if file_name.trim().is_empty() && bytes.is_empty() {
        return Ok(None);
    }

    let file_name = if file_name.trim().is_empty() {
        // Recorded blobs arrive without a name; derive one from the MIME type.
        blob_file_name(kind, content_type.as_deref())
    } else {
        file_name
    };

    Ok(Some(IncomingFile::new(file_name, bytes)))
}

/// `{field}.{ext}` for an unnamed blob. The extension is the first one
/// registered for the MIME type that the kind accepts, falling back to the
/// subtype itself without any `x-` prefix.
fn blob_file_name(kind: AttachmentKind, content_type: Option<&str>) -> String {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let registered = mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.iter().copied().find(|ext| kind.allows(ext)));
    let extension = match registered {
        Some(ext) => ext.to_string(),
        None => essence
            .split_once('/')
            .map(|(_, sub)| sub.trim_start_matches("x-").to_string())
            .unwrap_or_default(),
    };

    if extension.is_empty() {
        kind.as_str().to_string()
    } else {
        format!("{}.{extension}", kind.as_str())
    }
}
