use std::sync::Arc;

use common::storage::{AttachmentStore, AttachmentValidator};
use sea_orm::DatabaseConnection;

use crate::catalog::CatalogRepository;
use crate::config::AppConfig;
use crate::gateway::ReadGateway;
use crate::submission::SubmissionService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub attachments: Arc<dyn AttachmentStore>,
}

impl AppState {
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.db.clone(), self.config.catalog.page_size)
    }

    pub fn submissions(&self) -> SubmissionService {
        SubmissionService::new(
            AttachmentValidator::new(self.config.storage.max_attachment_size),
            self.attachments.clone(),
            self.catalog(),
        )
    }

    pub fn gateway(&self) -> ReadGateway {
        ReadGateway::new(self.catalog(), self.attachments.clone())
    }
}
