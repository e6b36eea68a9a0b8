use super::events::VideoMediaCreated;
use super::media::{AudioVideoMedia, EncodableSlot, ImageMedia};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

const TITLE_MAX_LENGTH: usize = 255;
const DESCRIPTION_MAX_LENGTH: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(Uuid);

impl VideoId {
    pub fn unique() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Rating {
    #[serde(rename = "ER")]
    Er,
    L,
    #[serde(rename = "10")]
    Age10,
    #[serde(rename = "12")]
    Age12,
    #[serde(rename = "14")]
    Age14,
    #[serde(rename = "16")]
    Age16,
    #[serde(rename = "18")]
    Age18,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Er => "ER",
            Rating::L => "L",
            Rating::Age10 => "10",
            Rating::Age12 => "12",
            Rating::Age14 => "14",
            Rating::Age16 => "16",
            Rating::Age18 => "18",
        }
    }

    pub fn of(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ER" => Some(Rating::Er),
            "L" => Some(Rating::L),
            "10" | "AGE_10" => Some(Rating::Age10),
            "12" | "AGE_12" => Some(Rating::Age12),
            "14" | "AGE_14" => Some(Rating::Age14),
            "16" | "AGE_16" => Some(Rating::Age16),
            "18" | "AGE_18" => Some(Rating::Age18),
            _ => None,
        }
    }
}

/// Descriptive metadata, everything a video has besides identity, media and audit dates.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProps {
    pub title: String,
    pub description: String,
    pub launched_at: i32,
    pub duration: f64,
    pub opened: bool,
    pub published: bool,
    pub rating: Rating,
    pub categories: HashSet<Uuid>,
    pub genres: HashSet<Uuid>,
    pub cast_members: HashSet<Uuid>,
}

/// Aggregate root. Media slots are replaced wholesale, never edited in place.
#[derive(Debug, Clone)]
pub struct Video {
    pub(super) id: VideoId,
    pub(super) props: VideoProps,
    pub(super) created_at: OffsetDateTime,
    pub(super) updated_at: OffsetDateTime,
    pub(super) banner: Option<ImageMedia>,
    pub(super) thumbnail: Option<ImageMedia>,
    pub(super) thumbnail_half: Option<ImageMedia>,
    pub(super) trailer: Option<AudioVideoMedia>,
    pub(super) video: Option<AudioVideoMedia>,
    pub(super) events: Vec<VideoMediaCreated>,
    /// Persisted revision, 0 until first saved. Saves against a stale revision are rejected.
    pub(super) version: i64,
}

impl Video {
    pub fn new_video(props: VideoProps) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: VideoId::unique(),
            props,
            created_at: now,
            updated_at: now,
            banner: None,
            thumbnail: None,
            thumbnail_half: None,
            trailer: None,
            video: None,
            events: Vec::new(),
            version: 0,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_text(&mut errors, "title", &self.props.title, TITLE_MAX_LENGTH);
        check_text(&mut errors, "description", &self.props.description, DESCRIPTION_MAX_LENGTH);
        errors
    }

    pub fn update(&mut self, props: VideoProps) -> &mut Self {
        self.props = props;
        self.touch();
        self
    }

    pub fn update_video_media(&mut self, media: AudioVideoMedia) -> &mut Self {
        self.on_audio_video_media_updated(&media);
        self.video = Some(media);
        self.touch();
        self
    }

    pub fn update_trailer_media(&mut self, media: AudioVideoMedia) -> &mut Self {
        self.on_audio_video_media_updated(&media);
        self.trailer = Some(media);
        self.touch();
        self
    }

    pub fn update_banner_media(&mut self, media: ImageMedia) -> &mut Self {
        self.banner = Some(media);
        self.touch();
        self
    }

    pub fn update_thumbnail_media(&mut self, media: ImageMedia) -> &mut Self {
        self.thumbnail = Some(media);
        self.touch();
        self
    }

    pub fn update_thumbnail_half_media(&mut self, media: ImageMedia) -> &mut Self {
        self.thumbnail_half = Some(media);
        self.touch();
        self
    }

    /// No-op when the slot is empty.
    pub fn processing(&mut self, slot: EncodableSlot) -> &mut Self {
        if let Some(next) = self.audio_video(slot).map(AudioVideoMedia::processing) {
            self.replace_audio_video(slot, next);
        }
        self
    }

    /// No-op when the slot is empty.
    pub fn completed(&mut self, slot: EncodableSlot, encoded_path: &str) -> &mut Self {
        if let Some(next) = self.audio_video(slot).map(|m| m.completed(encoded_path)) {
            self.replace_audio_video(slot, next);
        }
        self
    }

    /// Which encodable slot, if any, currently holds the media with this resource id.
    pub fn slot_for_resource(&self, resource_id: &str) -> Option<EncodableSlot> {
        [EncodableSlot::Video, EncodableSlot::Trailer]
            .into_iter()
            .find(|slot| self.audio_video(*slot).is_some_and(|m| m.id == resource_id))
    }

    pub fn audio_video(&self, slot: EncodableSlot) -> Option<&AudioVideoMedia> {
        match slot {
            EncodableSlot::Video => self.video.as_ref(),
            EncodableSlot::Trailer => self.trailer.as_ref(),
        }
    }

    /// Drains the domain events registered since the last call.
    pub fn take_events(&mut self) -> Vec<VideoMediaCreated> {
        std::mem::take(&mut self.events)
    }

    pub fn id(&self) -> VideoId {
        self.id
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn props(&self) -> &VideoProps {
        &self.props
    }

    pub fn title(&self) -> &str {
        &self.props.title
    }

    pub fn description(&self) -> &str {
        &self.props.description
    }

    pub fn launched_at(&self) -> i32 {
        self.props.launched_at
    }

    pub fn duration(&self) -> f64 {
        self.props.duration
    }

    pub fn opened(&self) -> bool {
        self.props.opened
    }

    pub fn published(&self) -> bool {
        self.props.published
    }

    pub fn rating(&self) -> Rating {
        self.props.rating
    }

    pub fn categories(&self) -> &HashSet<Uuid> {
        &self.props.categories
    }

    pub fn genres(&self) -> &HashSet<Uuid> {
        &self.props.genres
    }

    pub fn cast_members(&self) -> &HashSet<Uuid> {
        &self.props.cast_members
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    pub fn video(&self) -> Option<&AudioVideoMedia> {
        self.video.as_ref()
    }

    pub fn trailer(&self) -> Option<&AudioVideoMedia> {
        self.trailer.as_ref()
    }

    pub fn banner(&self) -> Option<&ImageMedia> {
        self.banner.as_ref()
    }

    pub fn thumbnail(&self) -> Option<&ImageMedia> {
        self.thumbnail.as_ref()
    }

    pub fn thumbnail_half(&self) -> Option<&ImageMedia> {
        self.thumbnail_half.as_ref()
    }

    fn replace_audio_video(&mut self, slot: EncodableSlot, media: AudioVideoMedia) {
        match slot {
            EncodableSlot::Video => self.update_video_media(media),
            EncodableSlot::Trailer => self.update_trailer_media(media),
        };
    }

    fn on_audio_video_media_updated(&mut self, media: &AudioVideoMedia) {
        if media.is_pending_encode() {
            self.events.push(VideoMediaCreated::new(self.id, &media.id, &media.raw_location));
        }
    }

    fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

fn check_text(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(format!("'{field}' should not be empty"));
    } else if trimmed.chars().count() > max {
        errors.push(format!("'{field}' must be between 1 and {max} characters"));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::modules::video::media::MediaStatus;

    pub(crate) fn props() -> VideoProps {
        VideoProps {
            title: "System Design Interviews".to_string(),
            description: "A walkthrough of common system design questions".to_string(),
            launched_at: 2022,
            duration: 120.10,
            opened: true,
            published: false,
            rating: Rating::L,
            categories: HashSet::from([Uuid::new_v4()]),
            genres: HashSet::from([Uuid::new_v4()]),
            cast_members: HashSet::new(),
        }
    }

    #[test]
    fn new_video_has_no_media() {
        let video = Video::new_video(props());

        assert!(video.video().is_none());
        assert!(video.trailer().is_none());
        assert!(video.banner().is_none());
        assert!(video.thumbnail().is_none());
        assert!(video.thumbnail_half().is_none());
        assert_eq!(video.created_at(), video.updated_at());
        assert!(video.validate().is_empty());
    }

    #[test]
    fn blank_title_and_oversized_description_are_reported() {
        let mut p = props();
        p.title = "   ".to_string();
        p.description = "a".repeat(DESCRIPTION_MAX_LENGTH + 1);

        let errors = Video::new_video(p).validate();

        assert_eq!(
            errors,
            vec![
                "'title' should not be empty".to_string(),
                "'description' must be between 1 and 4000 characters".to_string(),
            ]
        );
    }

    #[test]
    fn updating_a_slot_refreshes_updated_at() {
        let mut video = Video::new_video(props());
        let before = video.updated_at();

        video.update_banner_media(ImageMedia::new("abc", "banner.png", "videoId-1/type-BANNER"));

        assert!(video.updated_at() >= before);
        assert_eq!(video.banner().map(|b| b.location.as_str()), Some("videoId-1/type-BANNER"));
    }

    #[test]
    fn processing_a_pending_slot_keeps_raw_location() {
        let mut video = Video::new_video(props());
        video.update_video_media(AudioVideoMedia::new("abc", "movie.mp4", "raw/video"));

        video.processing(EncodableSlot::Video);

        let media = video.video().unwrap();
        assert_eq!(media.status, MediaStatus::Processing);
        assert_eq!(media.raw_location, "raw/video");
        assert!(media.encoded_location.is_none());
    }

    #[test]
    fn transitions_on_an_empty_slot_do_not_create_it() {
        let mut video = Video::new_video(props());
        let before = video.updated_at();

        video.processing(EncodableSlot::Trailer);
        video.completed(EncodableSlot::Trailer, "enc/trailer.mp4");

        assert!(video.trailer().is_none());
        assert_eq!(video.updated_at(), before);
    }

    #[test]
    fn completing_sets_encoded_location_from_pending_or_processing() {
        let mut video = Video::new_video(props());
        video.update_video_media(AudioVideoMedia::new("abc", "movie.mp4", "raw/video"));
        video.update_trailer_media(AudioVideoMedia::new("def", "trailer.mp4", "raw/trailer"));
        video.processing(EncodableSlot::Trailer);

        video.completed(EncodableSlot::Video, "enc/movie.mp4");
        video.completed(EncodableSlot::Trailer, "enc/trailer.mp4");

        let movie = video.video().unwrap();
        assert_eq!(movie.status, MediaStatus::Completed);
        assert_eq!(movie.encoded_location.as_deref(), Some("enc/movie.mp4"));

        let trailer = video.trailer().unwrap();
        assert_eq!(trailer.status, MediaStatus::Completed);
        assert_eq!(trailer.encoded_location.as_deref(), Some("enc/trailer.mp4"));
    }

    #[test]
    fn snapshot_taken_before_a_transition_is_untouched() {
        let mut video = Video::new_video(props());
        video.update_video_media(AudioVideoMedia::new("abc", "movie.mp4", "raw/video"));
        let snapshot = video.clone();

        video.completed(EncodableSlot::Video, "enc/movie.mp4");

        assert_eq!(snapshot.video().unwrap().status, MediaStatus::Pending);
        assert_eq!(video.video().unwrap().status, MediaStatus::Completed);
    }

    #[test]
    fn slot_for_resource_matches_only_the_live_media() {
        let mut video = Video::new_video(props());
        let first = AudioVideoMedia::new("abc", "movie.mp4", "raw/video");
        let trailer = AudioVideoMedia::new("def", "trailer.mp4", "raw/trailer");
        video.update_video_media(first.clone());
        video.update_trailer_media(trailer.clone());

        assert_eq!(video.slot_for_resource(&first.id), Some(EncodableSlot::Video));
        assert_eq!(video.slot_for_resource(&trailer.id), Some(EncodableSlot::Trailer));

        video.update_video_media(AudioVideoMedia::new("ghi", "movie-v2.mp4", "raw/video"));

        assert_eq!(video.slot_for_resource(&first.id), None);
        assert_eq!(video.slot_for_resource("unknown"), None);
    }

    #[test]
    fn pending_audio_video_uploads_register_media_created_events() {
        let mut video = Video::new_video(props());
        let media = AudioVideoMedia::new("abc", "movie.mp4", "raw/video");

        video.update_video_media(media.clone());
        video.update_banner_media(ImageMedia::new("x", "banner.png", "raw/banner"));
        video.completed(EncodableSlot::Video, "enc/movie.mp4");

        let events = video.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_id, media.id);
        assert_eq!(events[0].file_path, "raw/video");
        assert!(video.take_events().is_empty());
    }

    #[test]
    fn rating_lookup_accepts_labels_and_enum_names() {
        assert_eq!(Rating::of("er"), Some(Rating::Er));
        assert_eq!(Rating::of("AGE_14"), Some(Rating::Age14));
        assert_eq!(Rating::of("16"), Some(Rating::Age16));
        assert_eq!(Rating::of("21"), None);
    }
}
