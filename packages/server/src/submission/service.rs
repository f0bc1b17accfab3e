use std::sync::Arc;

use common::storage::{
    AttachmentKind, AttachmentRef, AttachmentStore, AttachmentValidator, ValidatedAttachment,
};
use common::{Category, Language};
use tracing::{info, instrument, warn};

use crate::catalog::{CatalogRepository, NewSiteRecord};
use crate::entity::site_record;
use crate::models::shared::{validate_optional_text, validate_required_text};

use super::context::{IncomingFile, SubmissionContext};
use super::error::SubmissionError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const PLACE_NAME_MAX_CHARS: usize = 200;

/// Attachment slots of a submission, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Image,
    Audio,
    Video,
    Document,
}

impl Slot {
    fn field(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    fn kind(self) -> AttachmentKind {
        match self {
            Self::Image => AttachmentKind::Image,
            Self::Audio => AttachmentKind::Audio,
            Self::Video => AttachmentKind::Video,
            Self::Document => AttachmentKind::Document,
        }
    }
}

struct PendingAttachment {
    slot: Slot,
    file: IncomingFile,
    validated: ValidatedAttachment,
}

/// A submission whose every field and file passed validation; nothing written yet.
struct ValidatedSubmission {
    title: String,
    description: String,
    category: Category,
    language: Language,
    place_name: Option<String>,
    latitude: f64,
    longitude: f64,
    image: PendingAttachment,
    optional: Vec<PendingAttachment>,
}

/// References written for one submission, image first.
struct StoredAttachments {
    image: AttachmentRef,
    written: Vec<(Slot, AttachmentRef)>,
}

impl StoredAttachments {
    fn slot(&self, slot: Slot) -> Option<AttachmentRef> {
        self.written
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, r)| r.clone())
    }
}

/// Orchestrates validation, attachment writes and the catalog insert for one
/// submission.
#[derive(Clone)]
pub struct SubmissionService {
    validator: AttachmentValidator,
    store: Arc<dyn AttachmentStore>,
    catalog: CatalogRepository,
}

impl SubmissionService {
    pub fn new(
        validator: AttachmentValidator,
        store: Arc<dyn AttachmentStore>,
        catalog: CatalogRepository,
    ) -> Self {
        Self {
            validator,
            store,
            catalog,
        }
    }

    /// Validate everything, write attachments (image, audio, video, document),
    /// then insert the record.
    ///
    /// If a write or the insert fails, attachments already written for this
    /// submission are deleted before the error is returned.
    #[instrument(skip(self, ctx), fields(title = %ctx.title))]
    pub async fn submit(
        &self,
        ctx: SubmissionContext,
    ) -> Result<site_record::Model, SubmissionError> {
        let submission = self.validate(ctx)?;

        let stored = self
            .store_attachments(&submission.image, &submission.optional)
            .await?;

        let record = NewSiteRecord {
            title: submission.title,
            description: submission.description,
            category: submission.category,
            language: submission.language,
            place_name: submission.place_name,
            latitude: submission.latitude,
            longitude: submission.longitude,
            image_ref: stored.image.clone(),
            audio_ref: stored.slot(Slot::Audio),
            video_ref: stored.slot(Slot::Video),
            document_ref: stored.slot(Slot::Document),
        };

        match self.catalog.insert(record).await {
            Ok(model) => {
                info!(
                    id = model.id,
                    category = %model.category,
                    attachments = stored.written.len(),
                    "Site submission accepted"
                );
                Ok(model)
            }
            Err(e) => {
                self.compensate(&stored.written).await;
                Err(SubmissionError::Persistence(e))
            }
        }
    }

    fn validate(&self, ctx: SubmissionContext) -> Result<ValidatedSubmission, SubmissionError> {
        let title = validate_required_text(&ctx.title, "Title", TITLE_MAX_CHARS)
            .map_err(|m| SubmissionError::field("title", m))?;
        let description =
            validate_required_text(&ctx.description, "Description", DESCRIPTION_MAX_CHARS)
                .map_err(|m| SubmissionError::field("description", m))?;

        if ctx.category.trim().is_empty() {
            return Err(SubmissionError::field("category", "Category is required"));
        }
        let category = ctx
            .category
            .parse::<Category>()
            .map_err(|e| SubmissionError::field("category", e.to_string()))?;

        let language = match ctx.language.as_deref().map(str::trim) {
            None | Some("") => Language::default(),
            Some(raw) => raw
                .parse::<Language>()
                .map_err(|e| SubmissionError::field("language", e.to_string()))?,
        };

        let place_name =
            validate_optional_text(ctx.place_name.as_deref(), "Place name", PLACE_NAME_MAX_CHARS)
                .map_err(|m| SubmissionError::field("place_name", m))?;

        let Some(image) = ctx.image else {
            return Err(SubmissionError::field("image", "An image is required"));
        };
        let image = self.check_file(Slot::Image, image)?;

        let mut optional = Vec::new();
        for (slot, file) in [
            (Slot::Audio, ctx.audio),
            (Slot::Video, ctx.video),
            (Slot::Document, ctx.document),
        ] {
            if let Some(file) = file {
                optional.push(self.check_file(slot, file)?);
            }
        }

        let (latitude, longitude) = match (ctx.latitude, ctx.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(SubmissionError::LocationRequired),
        };
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SubmissionError::field(
                "latitude",
                "Latitude must be between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SubmissionError::field(
                "longitude",
                "Longitude must be between -180 and 180",
            ));
        }

        Ok(ValidatedSubmission {
            title,
            description,
            category,
            language,
            place_name,
            latitude,
            longitude,
            image,
            optional,
        })
    }

    fn check_file(
        &self,
        slot: Slot,
        file: IncomingFile,
    ) -> Result<PendingAttachment, SubmissionError> {
        let validated = self
            .validator
            .validate(&file.file_name, file.bytes.len() as u64, slot.kind())
            .map_err(|source| SubmissionError::Attachment {
                field: slot.field(),
                source,
            })?;
        Ok(PendingAttachment {
            slot,
            file,
            validated,
        })
    }

    /// Write the image, then each optional attachment. A failed write removes
    /// everything already written for this submission.
    async fn store_attachments(
        &self,
        image: &PendingAttachment,
        optional: &[PendingAttachment],
    ) -> Result<StoredAttachments, SubmissionError> {
        let image_ref = self.store_one(image, &[]).await?;
        let mut written = vec![(Slot::Image, image_ref.clone())];
        for attachment in optional {
            let reference = self.store_one(attachment, &written).await?;
            written.push((attachment.slot, reference));
        }
        Ok(StoredAttachments {
            image: image_ref,
            written,
        })
    }

    async fn store_one(
        &self,
        attachment: &PendingAttachment,
        written: &[(Slot, AttachmentRef)],
    ) -> Result<AttachmentRef, SubmissionError> {
        match self
            .store
            .store(&attachment.file.bytes, &attachment.validated)
            .await
        {
            Ok(reference) => Ok(reference),
            Err(source) => {
                self.compensate(written).await;
                Err(SubmissionError::StorageWrite {
                    field: attachment.slot.field(),
                    source,
                })
            }
        }
    }

    /// Best-effort removal of attachments written by a failed submission.
    async fn compensate(&self, written: &[(Slot, AttachmentRef)]) {
        for (_, reference) in written {
            if let Err(e) = self.store.delete(reference).await {
                warn!(reference = %reference, error = %e, "Failed to remove orphaned attachment");
            }
        }
    }
}
