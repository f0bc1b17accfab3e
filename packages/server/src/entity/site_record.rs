use common::{Category, Language};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One catalog entry. Rows are append-only: inserted once, never updated or deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category: Category,

    pub language: Language,

    /// Free-text locality, kept alongside the coordinate pair.
    pub place_name: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Attachment references (`{kind}_{token}.{ext}`), written before the row.
    pub image_ref: String,
    pub audio_ref: Option<String>,
    pub video_ref: Option<String>,
    pub document_ref: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
