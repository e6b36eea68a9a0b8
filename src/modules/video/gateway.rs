use super::media::{AudioVideoMedia, ImageMedia, Resource, VideoMediaType, VideoResource};
use super::model::VideoId;
use crate::infrastructure::storage::{MediaStorage, StorageResult};
use std::sync::Arc;
use tracing::info;

/// Maps video media onto storage paths and wraps stored files into slot values.
#[derive(Clone)]
pub struct MediaResourceGateway {
    storage: Arc<dyn MediaStorage>,
    location_pattern: String,
    filename_pattern: String,
}

impl MediaResourceGateway {
    pub fn new(storage: Arc<dyn MediaStorage>, location_pattern: &str, filename_pattern: &str) -> Self {
        Self {
            storage,
            location_pattern: location_pattern.to_string(),
            filename_pattern: filename_pattern.to_string(),
        }
    }

    pub async fn store_audio_video(&self, id: VideoId, video_resource: &VideoResource) -> StorageResult<AudioVideoMedia> {
        let filepath = self.filepath(id, video_resource.media_type);
        let resource = &video_resource.resource;
        self.storage.store(&filepath, resource).await?;
        Ok(AudioVideoMedia::new(&resource.checksum, &resource.name, filepath))
    }

    pub async fn store_image(&self, id: VideoId, video_resource: &VideoResource) -> StorageResult<ImageMedia> {
        let filepath = self.filepath(id, video_resource.media_type);
        let resource = &video_resource.resource;
        self.storage.store(&filepath, resource).await?;
        Ok(ImageMedia::new(&resource.checksum, &resource.name, filepath))
    }

    pub async fn get_resource(&self, id: VideoId, media_type: VideoMediaType) -> StorageResult<Option<Resource>> {
        self.storage.get(&self.filepath(id, media_type)).await
    }

    pub async fn clear_resources(&self, id: VideoId) -> StorageResult<()> {
        let paths = self.storage.list(&format!("{}/", self.folder(id))).await?;
        if paths.is_empty() {
            return Ok(());
        }

        info!("Removing {} stored resources of video {}", paths.len(), id);
        self.storage.delete_all(&paths).await
    }

    fn folder(&self, id: VideoId) -> String {
        self.location_pattern.replace("{videoId}", &id.to_string())
    }

    fn filename(&self, media_type: VideoMediaType) -> String {
        self.filename_pattern.replace("{type}", media_type.as_str())
    }

    pub fn filepath(&self, id: VideoId, media_type: VideoMediaType) -> String {
        format!("{}/{}", self.folder(id), self.filename(media_type))
    }
}
