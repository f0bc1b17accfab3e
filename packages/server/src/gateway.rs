//! Read-side access for map and gallery clients.

use std::sync::Arc;

use common::storage::{AttachmentRef, AttachmentStore, BoxReader, StorageError};

use crate::catalog::{CatalogPage, CatalogQuery, CatalogRepository};
use crate::entity::site_record;
use crate::error::AppError;
use crate::models::site::MapPoint;

/// Attachment bytes ready to be streamed, with the metadata a response needs.
pub struct AttachmentBody {
    pub reference: AttachmentRef,
    pub content_type: String,
    pub size: u64,
    pub reader: BoxReader,
}

/// Serves catalog records and attachment bytes by reference, without exposing
/// where or how either is stored.
#[derive(Clone)]
pub struct ReadGateway {
    catalog: CatalogRepository,
    store: Arc<dyn AttachmentStore>,
}

impl ReadGateway {
    pub fn new(catalog: CatalogRepository, store: Arc<dyn AttachmentStore>) -> Self {
        Self { catalog, store }
    }

    pub async fn get_records(
        &self,
        search: Option<String>,
        page: Option<i64>,
    ) -> Result<CatalogPage, AppError> {
        Ok(self.catalog.query(CatalogQuery { search, page }).await?)
    }

    pub async fn get_all_records(&self) -> Result<Vec<site_record::Model>, AppError> {
        Ok(self.catalog.list_all().await?)
    }

    pub async fn get_record(&self, id: i32) -> Result<site_record::Model, AppError> {
        self.catalog
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Site not found".into()))
    }

    /// Records with both coordinates, projected to map markers.
    pub async fn map_points(&self) -> Result<Vec<MapPoint>, AppError> {
        Ok(self
            .catalog
            .list_all()
            .await?
            .into_iter()
            .filter_map(MapPoint::from_model)
            .collect())
    }

    /// Open an attachment for streaming. Malformed and unknown references are
    /// both reported as not found.
    pub async fn get_attachment(&self, raw_ref: &str) -> Result<AttachmentBody, StorageError> {
        let reference = AttachmentRef::parse(raw_ref)?;
        let size = self.store.size(&reference).await?;
        let reader = self.store.retrieve_stream(&reference).await?;
        let content_type = mime_guess::from_path(reference.as_str())
            .first_or_octet_stream()
            .to_string();

        Ok(AttachmentBody {
            reference,
            content_type,
            size,
            reader,
        })
    }

    /// Whether a reference resolves to stored bytes. Malformed references
    /// never do; I/O failures while checking are returned as errors.
    pub async fn has_attachment(&self, raw_ref: &str) -> Result<bool, StorageError> {
        match AttachmentRef::parse(raw_ref) {
            Ok(reference) => self.store.exists(&reference).await,
            Err(_) => Ok(false),
        }
    }
}
