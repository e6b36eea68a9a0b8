use super::media::VideoMediaType;
use super::model::VideoId;
use crate::common::response::ApiError;
use crate::infrastructure::storage::StorageError;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Video with ID {0} was not found")]
    NotFound(VideoId),

    #[error("Resource {media_type} not found for video {video_id}")]
    MediaNotFound {
        video_id: VideoId,
        media_type: VideoMediaType,
    },

    #[error("Media type {0} doesn't exist")]
    InvalidMediaType(String),

    #[error("Could not process video: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Video {0} was modified concurrently, try again")]
    Conflict(VideoId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("Event publication failure: {0}")]
    Publish(#[source] anyhow::Error),
}

impl VideoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VideoError::NotFound(_) | VideoError::MediaNotFound { .. } => StatusCode::NOT_FOUND,
            VideoError::InvalidMediaType(_) | VideoError::InvalidResource(_) => StatusCode::BAD_REQUEST,
            VideoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            VideoError::Conflict(_) => StatusCode::CONFLICT,
            VideoError::Storage(_) | VideoError::Persistence(_) | VideoError::Publish(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Infrastructure faults and lost write races; the message transport should redeliver on these.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VideoError::Conflict(_)
                | VideoError::Storage(_)
                | VideoError::Persistence(_)
                | VideoError::Publish(_)
        )
    }
}

impl From<VideoError> for ApiError {
    fn from(e: VideoError) -> Self {
        ApiError(e.to_string(), e.status_code())
    }
}

pub type VideoResult<T> = Result<T, VideoError>;
