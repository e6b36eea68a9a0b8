use crate::config::settings::AppConfig;
use crate::infrastructure::queue::EventPublisher;
use crate::modules::video::gateway::MediaResourceGateway;
use crate::modules::video::repository::VideoRepository;
use crate::modules::video::service::VideoService;
use crate::modules::video::status::UpdateMediaStatusService;
use crate::modules::video::upload::{GetMediaService, UploadMediaService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub videos: Arc<dyn VideoRepository>,
    pub media: MediaResourceGateway,
    pub events: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        videos: Arc<dyn VideoRepository>,
        media: MediaResourceGateway,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            videos,
            media,
            events,
        }
    }

    pub fn video_service(&self) -> VideoService {
        VideoService::new(self.videos.clone(), self.media.clone())
    }

    pub fn upload_media_service(&self) -> UploadMediaService {
        UploadMediaService::new(
            self.videos.clone(),
            self.media.clone(),
            self.events.clone(),
            &self.config.amqp.video_created_queue,
        )
    }

    pub fn get_media_service(&self) -> GetMediaService {
        GetMediaService::new(self.media.clone())
    }

    pub fn update_media_status_service(&self) -> UpdateMediaStatusService {
        UpdateMediaStatusService::new(self.videos.clone())
    }
}
