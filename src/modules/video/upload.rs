use super::error::{VideoError, VideoResult};
use super::gateway::MediaResourceGateway;
use super::media::{AudioVideoMedia, ImageMedia, Resource, VideoMediaType, VideoResource};
use super::model::{Video, VideoId};
use super::repository::{modify_video, Change, VideoRepository};
use crate::infrastructure::queue::EventPublisher;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMediaOutput {
    pub video_id: VideoId,
    pub media_type: VideoMediaType,
}

/// Stored media waiting to be recorded on its slot.
#[derive(Debug, Clone)]
enum SlotMedia {
    Video(AudioVideoMedia),
    Trailer(AudioVideoMedia),
    Banner(ImageMedia),
    Thumbnail(ImageMedia),
    ThumbnailHalf(ImageMedia),
}

impl SlotMedia {
    fn apply_to(self, video: &mut Video) {
        match self {
            SlotMedia::Video(media) => video.update_video_media(media),
            SlotMedia::Trailer(media) => video.update_trailer_media(media),
            SlotMedia::Banner(media) => video.update_banner_media(media),
            SlotMedia::Thumbnail(media) => video.update_thumbnail_media(media),
            SlotMedia::ThumbnailHalf(media) => video.update_thumbnail_half_media(media),
        };
    }
}

/// Stores a media file and records it on the video's matching slot.
#[derive(Clone)]
pub struct UploadMediaService {
    videos: Arc<dyn VideoRepository>,
    media: MediaResourceGateway,
    events: Arc<dyn EventPublisher>,
    media_created_queue: String,
}

impl UploadMediaService {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        media: MediaResourceGateway,
        events: Arc<dyn EventPublisher>,
        media_created_queue: &str,
    ) -> Self {
        Self {
            videos,
            media,
            events,
            media_created_queue: media_created_queue.to_string(),
        }
    }

    pub async fn execute(&self, video_id: VideoId, resource: VideoResource) -> VideoResult<UploadMediaOutput> {
        if self
            .videos
            .find_by_id(video_id)
            .await
            .map_err(VideoError::Persistence)?
            .is_none()
        {
            return Err(VideoError::NotFound(video_id));
        }

        let media_type = resource.media_type;
        let media = match media_type {
            VideoMediaType::Video => SlotMedia::Video(self.media.store_audio_video(video_id, &resource).await?),
            VideoMediaType::Trailer => SlotMedia::Trailer(self.media.store_audio_video(video_id, &resource).await?),
            VideoMediaType::Banner => SlotMedia::Banner(self.media.store_image(video_id, &resource).await?),
            VideoMediaType::Thumbnail => SlotMedia::Thumbnail(self.media.store_image(video_id, &resource).await?),
            VideoMediaType::ThumbnailHalf => {
                SlotMedia::ThumbnailHalf(self.media.store_image(video_id, &resource).await?)
            }
        };

        let (mut saved, ()) = modify_video(self.videos.as_ref(), video_id, |video| {
            media.clone().apply_to(video);
            Ok(Change::Save(()))
        })
        .await?
        .ok_or(VideoError::NotFound(video_id))?;
        info!("Stored {} media for video {}", media_type, video_id);

        self.publish_events(&mut saved).await?;

        Ok(UploadMediaOutput { video_id, media_type })
    }

    async fn publish_events(&self, video: &mut Video) -> VideoResult<()> {
        for event in video.take_events() {
            let payload = serde_json::to_vec(&event).map_err(|e| VideoError::Publish(e.into()))?;
            self.events
                .publish(&self.media_created_queue, &payload)
                .await
                .map_err(VideoError::Publish)?;
            debug!("Published media created event for resource {}", event.resource_id);
        }
        Ok(())
    }
}

/// Reads back a stored media file.
#[derive(Clone)]
pub struct GetMediaService {
    media: MediaResourceGateway,
}

impl GetMediaService {
    pub fn new(media: MediaResourceGateway) -> Self {
        Self { media }
    }

    pub async fn execute(&self, video_id: VideoId, media_type: &str) -> VideoResult<Resource> {
        let media_type = VideoMediaType::of(media_type)
            .ok_or_else(|| VideoError::InvalidMediaType(media_type.to_string()))?;

        self.media
            .get_resource(video_id, media_type)
            .await?
            .ok_or(VideoError::MediaNotFound { video_id, media_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::queue::MockEventPublisher;
    use crate::infrastructure::storage::memory::InMemoryMediaStorage;
    use crate::infrastructure::storage::{MediaStorage, MockMediaStorage};
    use crate::modules::video::media::MediaStatus;
    use crate::modules::video::model::tests::props;
    use crate::modules::video::repository::memory::InMemoryVideoRepository;
    use crate::modules::video::repository::MockVideoRepository;

    struct Fixture {
        videos: InMemoryVideoRepository,
        storage: InMemoryMediaStorage,
        service: UploadMediaService,
    }

    fn quiet_publisher() -> MockEventPublisher {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().returning(|_, _| Ok(()));
        publisher
    }

    async fn fixture(video: Video) -> Fixture {
        let videos = InMemoryVideoRepository::with([video]).await;
        let storage = InMemoryMediaStorage::new();
        let gateway = MediaResourceGateway::new(Arc::new(storage.clone()), "videoId-{videoId}", "type-{type}");
        let service = UploadMediaService::new(
            Arc::new(videos.clone()),
            gateway,
            Arc::new(quiet_publisher()),
            "video.created.queue",
        );
        Fixture { videos, storage, service }
    }

    fn resource(media_type: VideoMediaType, checksum: &str) -> VideoResource {
        let content_type = if media_type.encodable().is_some() { "video/mp4" } else { "image/png" };
        VideoResource::new(
            media_type,
            Resource::new(b"raw-bytes".to_vec(), checksum, content_type, format!("{media_type}.bin")),
        )
    }

    #[tokio::test]
    async fn every_slot_type_is_stored_and_recorded() {
        let video = Video::new_video(props());
        let id = video.id();
        let f = fixture(video).await;

        for media_type in VideoMediaType::ALL {
            let output = f.service.execute(id, resource(media_type, media_type.as_str())).await.unwrap();
            assert_eq!(output, UploadMediaOutput { video_id: id, media_type });
        }

        let stored = f.videos.find_by_id(id).await.unwrap().unwrap();
        let expected_location = |t: VideoMediaType| format!("videoId-{id}/type-{t}");

        let movie = stored.video().unwrap();
        assert_eq!(movie.checksum, "VIDEO");
        assert_eq!(movie.raw_location, expected_location(VideoMediaType::Video));
        let trailer = stored.trailer().unwrap();
        assert_eq!(trailer.checksum, "TRAILER");
        assert_eq!(trailer.raw_location, expected_location(VideoMediaType::Trailer));
        assert_eq!(stored.banner().unwrap().location, expected_location(VideoMediaType::Banner));
        assert_eq!(stored.thumbnail().unwrap().checksum, "THUMBNAIL");
        assert_eq!(
            stored.thumbnail_half().unwrap().location,
            expected_location(VideoMediaType::ThumbnailHalf)
        );
        assert_eq!(f.storage.len().await, 5);
        assert_eq!(f.videos.save_count().await, 5);
    }

    #[tokio::test]
    async fn uploaded_audio_video_starts_pending() {
        let video = Video::new_video(props());
        let id = video.id();
        let f = fixture(video).await;

        f.service.execute(id, resource(VideoMediaType::Trailer, "abc")).await.unwrap();

        let stored = f.videos.find_by_id(id).await.unwrap().unwrap();
        let trailer = stored.trailer().unwrap();
        assert_eq!(trailer.status, MediaStatus::Pending);
        assert!(trailer.encoded_location.is_none());
    }

    #[tokio::test]
    async fn re_upload_overwrites_storage_and_supersedes_resource_id() {
        let video = Video::new_video(props());
        let id = video.id();
        let f = fixture(video).await;

        f.service.execute(id, resource(VideoMediaType::Video, "first")).await.unwrap();
        let first = f.videos.find_by_id(id).await.unwrap().unwrap().video().cloned().unwrap();

        f.service.execute(id, resource(VideoMediaType::Video, "second")).await.unwrap();
        let stored = f.videos.find_by_id(id).await.unwrap().unwrap();
        let second = stored.video().unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.checksum, "second");
        assert_eq!(stored.slot_for_resource(&first.id), None);
        assert_eq!(f.storage.len().await, 1);
    }

    #[tokio::test]
    async fn publishes_media_created_only_for_audio_video() {
        let video = Video::new_video(props());
        let id = video.id();
        let videos = InMemoryVideoRepository::with([video]).await;
        let storage = InMemoryMediaStorage::new();

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|queue, payload| {
                let event: serde_json::Value = serde_json::from_slice(payload).unwrap();
                queue.to_string() == "video.created.queue" && event["file_path"].as_str().is_some_and(|p| p.ends_with("type-VIDEO"))
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = UploadMediaService::new(
            Arc::new(videos),
            MediaResourceGateway::new(Arc::new(storage), "videoId-{videoId}", "type-{type}"),
            Arc::new(publisher),
            "video.created.queue",
        );

        service.execute(id, resource(VideoMediaType::Video, "abc")).await.unwrap();
        service.execute(id, resource(VideoMediaType::Banner, "def")).await.unwrap();
    }

    #[tokio::test]
    async fn missing_video_fails_without_touching_storage() {
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(|_| Ok(None));
        videos.expect_save().never();

        let mut storage = MockMediaStorage::new();
        storage.expect_store().never();

        let service = UploadMediaService::new(
            Arc::new(videos),
            MediaResourceGateway::new(Arc::new(storage), "videoId-{videoId}", "type-{type}"),
            Arc::new(quiet_publisher()),
            "video.created.queue",
        );

        let id = VideoId::unique();
        let result = service.execute(id, resource(VideoMediaType::Video, "abc")).await;

        assert!(matches!(result, Err(VideoError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn storage_failure_propagates_and_nothing_is_saved() {
        let video = Video::new_video(props());
        let id = video.id();
        let videos = InMemoryVideoRepository::with([video]).await;

        let mut storage = MockMediaStorage::new();
        storage
            .expect_store()
            .returning(|path, _| Err(crate::infrastructure::storage::StorageError::Backend(format!("{path} unavailable"))));

        let service = UploadMediaService::new(
            Arc::new(videos.clone()),
            MediaResourceGateway::new(Arc::new(storage), "videoId-{videoId}", "type-{type}"),
            Arc::new(quiet_publisher()),
            "video.created.queue",
        );

        let result = service.execute(id, resource(VideoMediaType::Banner, "abc")).await;

        assert!(matches!(result, Err(VideoError::Storage(_))));
        assert_eq!(videos.save_count().await, 0);
    }

    #[tokio::test]
    async fn get_media_reads_back_stored_resource() {
        let storage = InMemoryMediaStorage::new();
        let gateway = MediaResourceGateway::new(Arc::new(storage.clone()), "videoId-{videoId}", "type-{type}");
        let id = VideoId::unique();
        let uploaded = resource(VideoMediaType::Banner, "abc");
        storage
            .store(&gateway.filepath(id, VideoMediaType::Banner), &uploaded.resource)
            .await
            .unwrap();

        let service = GetMediaService::new(gateway);

        assert_eq!(service.execute(id, "banner").await.unwrap(), uploaded.resource);
        assert!(matches!(
            service.execute(id, "thumbnail").await,
            Err(VideoError::MediaNotFound { media_type: VideoMediaType::Thumbnail, .. })
        ));
        assert!(matches!(
            service.execute(id, "poster").await,
            Err(VideoError::InvalidMediaType(t)) if t == "poster"
        ));
    }
}
