use super::media::{AudioVideoMedia, ImageMedia, MediaStatus, VideoMediaType};
use super::model::{Rating, Video, VideoProps};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VideoRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1800, max = 3000, message = "Launch year is out of range"))]
    pub launched_at: i32,
    #[validate(range(min = 0.0, message = "Duration can't be negative"))]
    pub duration: f64,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub published: bool,
    pub rating: Rating,
    #[serde(default)]
    pub categories: HashSet<Uuid>,
    #[serde(default)]
    pub genres: HashSet<Uuid>,
    #[serde(default)]
    pub cast_members: HashSet<Uuid>,
}

impl From<VideoRequest> for VideoProps {
    fn from(req: VideoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            launched_at: req.launched_at,
            duration: req.duration,
            opened: req.opened,
            published: req.published,
            rating: req.rating,
            categories: req.categories,
            genres: req.genres,
            cast_members: req.cast_members,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AudioVideoMediaResponse {
    pub id: String,
    pub checksum: String,
    pub name: String,
    pub raw_location: String,
    pub encoded_location: Option<String>,
    pub status: MediaStatus,
}

impl From<&AudioVideoMedia> for AudioVideoMediaResponse {
    fn from(m: &AudioVideoMedia) -> Self {
        Self {
            id: m.id.clone(),
            checksum: m.checksum.clone(),
            name: m.name.clone(),
            raw_location: m.raw_location.clone(),
            encoded_location: m.encoded_location.clone(),
            status: m.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageMediaResponse {
    pub checksum: String,
    pub name: String,
    pub location: String,
}

impl From<&ImageMedia> for ImageMediaResponse {
    fn from(m: &ImageMedia) -> Self {
        Self {
            checksum: m.checksum.clone(),
            name: m.name.clone(),
            location: m.location.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub launched_at: i32,
    pub duration: f64,
    pub opened: bool,
    pub published: bool,
    pub rating: Rating,
    pub categories: Vec<Uuid>,
    pub genres: Vec<Uuid>,
    pub cast_members: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
    pub video: Option<AudioVideoMediaResponse>,
    pub trailer: Option<AudioVideoMediaResponse>,
    pub banner: Option<ImageMediaResponse>,
    pub thumbnail: Option<ImageMediaResponse>,
    pub thumbnail_half: Option<ImageMediaResponse>,
}

fn sorted(ids: &HashSet<Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.iter().copied().collect();
    ids.sort();
    ids
}

impl From<&Video> for VideoResponse {
    fn from(v: &Video) -> Self {
        Self {
            id: v.id().value(),
            title: v.title().to_string(),
            description: v.description().to_string(),
            launched_at: v.launched_at(),
            duration: v.duration(),
            opened: v.opened(),
            published: v.published(),
            rating: v.rating(),
            categories: sorted(v.categories()),
            genres: sorted(v.genres()),
            cast_members: sorted(v.cast_members()),
            created_at: v.created_at(),
            updated_at: v.updated_at(),
            video: v.video().map(Into::into),
            trailer: v.trailer().map(Into::into),
            banner: v.banner().map(Into::into),
            thumbnail: v.thumbnail().map(Into::into),
            thumbnail_half: v.thumbnail_half().map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadMediaResponse {
    pub video_id: Uuid,
    pub media_type: VideoMediaType,
}
