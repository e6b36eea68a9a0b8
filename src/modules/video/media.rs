use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// The five media slots a video owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoMediaType {
    Video,
    Trailer,
    Banner,
    Thumbnail,
    ThumbnailHalf,
}

/// Slots whose content goes through the external encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncodableSlot {
    Video,
    Trailer,
}

impl VideoMediaType {
    pub const ALL: [VideoMediaType; 5] = [
        VideoMediaType::Video,
        VideoMediaType::Trailer,
        VideoMediaType::Banner,
        VideoMediaType::Thumbnail,
        VideoMediaType::ThumbnailHalf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoMediaType::Video => "VIDEO",
            VideoMediaType::Trailer => "TRAILER",
            VideoMediaType::Banner => "BANNER",
            VideoMediaType::Thumbnail => "THUMBNAIL",
            VideoMediaType::ThumbnailHalf => "THUMBNAIL_HALF",
        }
    }

    /// Case-insensitive lookup, `thumbnail-half` and `thumbnail_half` both resolve.
    pub fn of(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }

    pub fn encodable(self) -> Option<EncodableSlot> {
        match self {
            VideoMediaType::Video => Some(EncodableSlot::Video),
            VideoMediaType::Trailer => Some(EncodableSlot::Trailer),
            VideoMediaType::Banner | VideoMediaType::Thumbnail | VideoMediaType::ThumbnailHalf => None,
        }
    }
}

impl fmt::Display for VideoMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EncodableSlot> for VideoMediaType {
    fn from(slot: EncodableSlot) -> Self {
        match slot {
            EncodableSlot::Video => VideoMediaType::Video,
            EncodableSlot::Trailer => VideoMediaType::Trailer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Pending,
    Processing,
    Completed,
}

impl MediaStatus {
    fn rank(self) -> u8 {
        match self {
            MediaStatus::Pending => 0,
            MediaStatus::Processing => 1,
            MediaStatus::Completed => 2,
        }
    }

    /// Statuses only move forward; re-entering the same status is allowed.
    pub fn can_advance_to(self, next: MediaStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// Value of an encodable slot. `id` correlates encoder callbacks with this exact upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AudioVideoMedia {
    pub id: String,
    pub checksum: String,
    pub name: String,
    pub raw_location: String,
    pub encoded_location: Option<String>,
    pub status: MediaStatus,
}

impl AudioVideoMedia {
    pub fn new(checksum: impl Into<String>, name: impl Into<String>, raw_location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            checksum: checksum.into(),
            name: name.into(),
            raw_location: raw_location.into(),
            encoded_location: None,
            status: MediaStatus::Pending,
        }
    }

    pub fn is_pending_encode(&self) -> bool {
        self.status == MediaStatus::Pending
    }

    /// A completed media stays completed.
    pub fn processing(&self) -> Self {
        if !self.status.can_advance_to(MediaStatus::Processing) {
            return self.clone();
        }

        Self {
            status: MediaStatus::Processing,
            encoded_location: None,
            ..self.clone()
        }
    }

    pub fn completed(&self, encoded_location: impl Into<String>) -> Self {
        Self {
            status: MediaStatus::Completed,
            encoded_location: Some(encoded_location.into()),
            ..self.clone()
        }
    }
}

/// Value of a static slot; its presence means it is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageMedia {
    pub checksum: String,
    pub name: String,
    pub location: String,
}

impl ImageMedia {
    pub fn new(checksum: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            checksum: checksum.into(),
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Raw uploaded bytes plus what the client declared about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub content: Bytes,
    pub checksum: String,
    pub content_type: String,
    pub name: String,
}

impl Resource {
    pub fn new(
        content: impl Into<Bytes>,
        checksum: impl Into<String>,
        content_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            checksum: checksum.into(),
            content_type: content_type.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoResource {
    pub media_type: VideoMediaType,
    pub resource: Resource,
}

impl VideoResource {
    pub fn new(media_type: VideoMediaType, resource: Resource) -> Self {
        Self { media_type, resource }
    }
}
