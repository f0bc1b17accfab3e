use chrono::{DateTime, Utc};
use common::{Category, Language};
use serde::{Deserialize, Serialize};

use crate::entity::site_record;

use super::shared::Pagination;

/// Query parameters for catalog listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct SiteListQuery {
    /// Case-insensitive substring matched against title OR category.
    #[param(example = "temple")]
    pub search: Option<String>,
    /// 1-based page number; out-of-range values are clamped.
    #[param(example = 1)]
    pub page: Option<i64>,
}

/// Full catalog record as served to map/gallery clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SiteResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Golconda Fort")]
    pub title: String,
    #[schema(example = "A fortified citadel built by the Kakatiyas.")]
    pub description: String,
    pub category: Category,
    pub language: Language,
    #[schema(example = "Hyderabad")]
    pub place_name: Option<String>,
    #[schema(example = 17.3833)]
    pub latitude: Option<f64>,
    #[schema(example = 78.4011)]
    pub longitude: Option<f64>,
    /// Reference to fetch via `/api/v1/attachments/{ref}`.
    #[schema(example = "image_0f8a2c4e6b1d4f3a9c7e5b2d1a0f9e8d.png")]
    pub image_ref: String,
    pub audio_ref: Option<String>,
    pub video_ref: Option<String>,
    pub document_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<site_record::Model> for SiteResponse {
    fn from(model: site_record::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            language: model.language,
            place_name: model.place_name,
            latitude: model.latitude,
            longitude: model.longitude,
            image_ref: model.image_ref,
            audio_ref: model.audio_ref,
            video_ref: model.video_ref,
            document_ref: model.document_ref,
            created_at: model.created_at,
        }
    }
}

/// One page of the catalog, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SiteListResponse {
    pub data: Vec<SiteResponse>,
    pub pagination: Pagination,
}

/// Every catalog record, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SiteCollectionResponse {
    pub data: Vec<SiteResponse>,
    pub total: u64,
}

/// A record reduced to what a map marker needs.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MapPoint {
    pub id: i32,
    pub title: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub image_ref: String,
    pub audio_ref: Option<String>,
}

impl MapPoint {
    /// `None` unless the record carries both coordinates.
    pub fn from_model(model: site_record::Model) -> Option<Self> {
        let (latitude, longitude) = (model.latitude?, model.longitude?);
        Some(Self {
            id: model.id,
            title: model.title,
            category: model.category,
            latitude,
            longitude,
            image_ref: model.image_ref,
            audio_ref: model.audio_ref,
        })
    }
}

/// Records that can be placed on a map.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MapPointsResponse {
    pub points: Vec<MapPoint>,
    pub total: u64,
}
