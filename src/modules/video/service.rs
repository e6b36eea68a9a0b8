use super::error::{VideoError, VideoResult};
use super::gateway::MediaResourceGateway;
use super::model::{Video, VideoId, VideoProps};
use super::repository::{modify_video, Change, VideoRepository};
use std::sync::Arc;
use tracing::info;

/// Registers, reads, edits and removes videos.
#[derive(Clone)]
pub struct VideoService {
    videos: Arc<dyn VideoRepository>,
    media: MediaResourceGateway,
}

impl VideoService {
    pub fn new(videos: Arc<dyn VideoRepository>, media: MediaResourceGateway) -> Self {
        Self { videos, media }
    }

    pub async fn create(&self, props: VideoProps) -> VideoResult<Video> {
        let video = Video::new_video(props);

        let errors = video.validate();
        if !errors.is_empty() {
            return Err(VideoError::Validation(errors));
        }

        let video = self.videos.save(video).await.map_err(VideoError::Persistence)?;
        info!("Video {} created", video.id());
        Ok(video)
    }

    pub async fn get(&self, id: VideoId) -> VideoResult<Video> {
        self.videos
            .find_by_id(id)
            .await
            .map_err(VideoError::Persistence)?
            .ok_or(VideoError::NotFound(id))
    }

    /// Replaces the metadata of a video. Its media slots are left as they are.
    pub async fn update(&self, id: VideoId, props: VideoProps) -> VideoResult<Video> {
        let (video, ()) = modify_video(self.videos.as_ref(), id, |video| {
            video.update(props.clone());

            let errors = video.validate();
            if !errors.is_empty() {
                return Err(VideoError::Validation(errors));
            }
            Ok(Change::Save(()))
        })
        .await?
        .ok_or(VideoError::NotFound(id))?;

        info!("Video {} updated", id);
        Ok(video)
    }

    /// Deleting an unknown video succeeds.
    pub async fn delete(&self, id: VideoId) -> VideoResult<()> {
        self.videos.delete_by_id(id).await.map_err(VideoError::Persistence)?;
        self.media.clear_resources(id).await?;
        info!("Video {} deleted", id);
        Ok(())
    }
}
