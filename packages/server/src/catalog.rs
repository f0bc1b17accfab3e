//! Catalog repository: append-only storage of site records.

use chrono::Utc;
use common::storage::AttachmentRef;
use common::{Category, Language};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::site_record;
use crate::models::shared::{Pagination, escape_like};

/// A validated record waiting for its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewSiteRecord {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub language: Language,
    pub place_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub image_ref: AttachmentRef,
    pub audio_ref: Option<AttachmentRef>,
    pub video_ref: Option<AttachmentRef>,
    pub document_ref: Option<AttachmentRef>,
}

/// Filter and page selection for [`CatalogRepository::query`].
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug)]
pub struct CatalogPage {
    pub records: Vec<site_record::Model>,
    pub pagination: Pagination,
}

/// Lower-case a search term the same way the backend's `lower()` folds the
/// columns it is compared with. SQLite only folds ASCII letters.
fn fold_search_term(term: &str, backend: DbBackend) -> String {
    match backend {
        DbBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

/// Repository over the `site_record` table.
///
/// Holds a clone of the pooled connection; there is no update or delete path.
#[derive(Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
    page_size: u64,
}

impl CatalogRepository {
    pub fn new(db: DatabaseConnection, page_size: u64) -> Self {
        Self {
            db,
            page_size: Ord::max(page_size, 1),
        }
    }

    /// Append a record, assigning its id and creation timestamp.
    #[instrument(skip(self, record), fields(title = %record.title))]
    pub async fn insert(&self, record: NewSiteRecord) -> Result<site_record::Model, DbErr> {
        let active = site_record::ActiveModel {
            title: Set(record.title),
            description: Set(record.description),
            category: Set(record.category),
            language: Set(record.language),
            place_name: Set(record.place_name),
            latitude: Set(Some(record.latitude)),
            longitude: Set(Some(record.longitude)),
            image_ref: Set(record.image_ref.to_string()),
            audio_ref: Set(record.audio_ref.map(|r| r.to_string())),
            video_ref: Set(record.video_ref.map(|r| r.to_string())),
            document_ref: Set(record.document_ref.map(|r| r.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let model = active.insert(&txn).await?;
        txn.commit().await?;

        Ok(model)
    }

    /// One page of records, newest first, optionally filtered by a
    /// case-insensitive substring of the title OR the category.
    #[instrument(skip(self))]
    pub async fn query(&self, query: CatalogQuery) -> Result<CatalogPage, DbErr> {
        let mut select = site_record::Entity::find();

        if let Some(ref search) = query.search {
            let term = escape_like(search.trim());
            if !term.is_empty() {
                let pattern = format!(
                    "%{}%",
                    fold_search_term(&term, self.db.get_database_backend())
                );
                select = select.filter(
                    Condition::any()
                        .add(
                            Expr::expr(Func::lower(Expr::col(site_record::Column::Title)))
                                .like(LikeExpr::new(pattern.clone()).escape('\\')),
                        )
                        .add(
                            Expr::expr(Func::lower(Expr::col(site_record::Column::Category)))
                                .like(LikeExpr::new(pattern).escape('\\')),
                        ),
                );
            }
        }

        let total = select.clone().count(&self.db).await?;
        let pagination = Pagination::clamped(query.page.unwrap_or(1), self.page_size, total);

        let records = select
            .order_by_desc(site_record::Column::CreatedAt)
            .order_by_desc(site_record::Column::Id)
            .offset(Some(pagination.offset()))
            .limit(Some(pagination.per_page))
            .all(&self.db)
            .await?;

        Ok(CatalogPage {
            records,
            pagination,
        })
    }

    /// Every record, newest first. Records without coordinates are included;
    /// map consumers skip them.
    pub async fn list_all(&self) -> Result<Vec<site_record::Model>, DbErr> {
        site_record::Entity::find()
            .order_by_desc(site_record::Column::CreatedAt)
            .order_by_desc(site_record::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn find(&self, id: i32) -> Result<Option<site_record::Model>, DbErr> {
        site_record::Entity::find_by_id(id).one(&self.db).await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        site_record::Entity::find().count(&self.db).await
    }
}
