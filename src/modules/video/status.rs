//! Applies encoder results to the media slot they were issued for.
//!
//! Results are correlated on the per-upload resource id, never on the slot type alone: a slot
//! re-uploaded while an older file was still encoding gets a new resource id, so the older
//! result no longer matches anything and is dropped.

use super::error::VideoResult;
use super::media::{EncodableSlot, MediaStatus};
use super::model::VideoId;
use super::repository::{modify_video, Change, VideoRepository};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMediaStatusCommand {
    pub status: MediaStatus,
    pub video_id: VideoId,
    pub resource_id: String,
    pub folder: String,
    pub filename: String,
}

impl UpdateMediaStatusCommand {
    pub fn encoded_path(&self) -> String {
        format!("{}/{}", self.folder, self.filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatusOutcome {
    Updated(EncodableSlot),
    VideoNotFound,
    /// The resource id belongs to no live slot.
    Unmatched,
    /// PENDING carries no transition.
    Skipped,
}

#[derive(Clone)]
pub struct UpdateMediaStatusService {
    videos: Arc<dyn VideoRepository>,
}

impl UpdateMediaStatusService {
    pub fn new(videos: Arc<dyn VideoRepository>) -> Self {
        Self { videos }
    }

    /// Only repository failures are returned as errors.
    pub async fn execute(&self, command: UpdateMediaStatusCommand) -> VideoResult<MediaStatusOutcome> {
        let encoded_path = command.encoded_path();

        let changed = modify_video(self.videos.as_ref(), command.video_id, |video| {
            let Some(slot) = video.slot_for_resource(&command.resource_id) else {
                return Ok(Change::Keep(MediaStatusOutcome::Unmatched));
            };

            match command.status {
                MediaStatus::Pending => Ok(Change::Keep(MediaStatusOutcome::Skipped)),
                MediaStatus::Processing => {
                    video.processing(slot);
                    Ok(Change::Save(MediaStatusOutcome::Updated(slot)))
                }
                MediaStatus::Completed => {
                    video.completed(slot, &encoded_path);
                    Ok(Change::Save(MediaStatusOutcome::Updated(slot)))
                }
            }
        })
        .await?;

        let Some((_, outcome)) = changed else {
            warn!(video_id = %command.video_id, resource_id = %command.resource_id, "discarding media status: video not found");
            return Ok(MediaStatusOutcome::VideoNotFound);
        };

        match outcome {
            MediaStatusOutcome::Updated(slot) => {
                info!(video_id = %command.video_id, ?slot, status = ?command.status, "media status updated");
            }
            MediaStatusOutcome::Unmatched => {
                info!(video_id = %command.video_id, resource_id = %command.resource_id, "discarding media status: resource superseded");
            }
            MediaStatusOutcome::Skipped => {
                debug!(video_id = %command.video_id, resource_id = %command.resource_id, "pending status carries no transition");
            }
            MediaStatusOutcome::VideoNotFound => {}
        }

        Ok(outcome)
    }
}
