use super::dto::{VideoRequest, UploadMediaResponse, VideoResponse};
use super::error::VideoError;
use super::media::{Resource, VideoMediaType, VideoResource};
use super::model::VideoId;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::{check_content_type, read_field};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const MEDIA_FILE_FIELD: &str = "media_file";

/// Register a video
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = VideoRequest,
    responses(
        (status = 201, description = "Video created", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Bad Request"),
        (status = 422, description = "Invalid video"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Videos"
)]
pub async fn create_video(
    State(state): State<AppState>,
    Json(payload): Json<VideoRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match state.video_service().create(payload.into()).await {
        Ok(video) => ApiSuccess(
            ApiResponse::success(VideoResponse::from(&video), "Video created successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get video by ID
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video details", body = ApiResponse<VideoResponse>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn get_video(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.video_service().get(VideoId::from_uuid(id)).await {
        Ok(video) => ApiSuccess(
            ApiResponse::success(VideoResponse::from(&video), "Video retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Replace video metadata
///
/// Media slots are not touched.
#[utoipa::path(
    put,
    path = "/api/v1/videos/{id}",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = VideoRequest,
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Video not found"),
        (status = 409, description = "Concurrent modification"),
        (status = 422, description = "Invalid video")
    ),
    tag = "Videos"
)]
pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VideoRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match state.video_service().update(VideoId::from_uuid(id), payload.into()).await {
        Ok(video) => ApiSuccess(
            ApiResponse::success(VideoResponse::from(&video), "Video updated successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Delete video and its stored media
#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<String>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Videos"
)]
pub async fn delete_video(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.video_service().delete(VideoId::from_uuid(id)).await {
        Ok(()) => ApiSuccess(
            ApiResponse::success((), "Video deleted successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Upload a media file into one of the video's slots
///
/// VIDEO and TRAILER take `video/*` files, the image slots take `image/*`.
#[utoipa::path(
    post,
    path = "/api/v1/videos/{id}/medias/{type}",
    params(
        ("id" = Uuid, Path, description = "Video ID"),
        ("type" = VideoMediaType, Path, description = "Media slot")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media stored", body = ApiResponse<UploadMediaResponse>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Video not found"),
        (status = 409, description = "Concurrent modification"),
        (status = 413, description = "File larger than the upload limit"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Videos"
)]
pub async fn upload_media(
    State(state): State<AppState>,
    Path((id, media_type)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let video_id = VideoId::from_uuid(id);
    let Some(media_type) = VideoMediaType::of(&media_type) else {
        return ApiError::from(VideoError::InvalidMediaType(media_type)).into_response();
    };

    let resource = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                let message = format!("Missing multipart field '{}'", MEDIA_FILE_FIELD);
                return ApiError(message, StatusCode::BAD_REQUEST).into_response();
            }
            Err(e) => return ApiError(e.body_text(), e.status()).into_response(),
        };

        if field.name() != Some(MEDIA_FILE_FIELD) {
            continue;
        }

        match read_media_file(field, media_type).await {
            Ok(resource) => break resource,
            Err(e) => return e.into_response(),
        }
    };

    info!("Uploading {} ({} bytes) for video {}", media_type, resource.content.len(), video_id);

    let service = state.upload_media_service();
    match service.execute(video_id, VideoResource::new(media_type, resource)).await {
        Ok(output) => ApiSuccess(
            ApiResponse::success(
                UploadMediaResponse {
                    video_id: output.video_id.value(),
                    media_type: output.media_type,
                },
                "Media uploaded successfully",
            ),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn read_media_file(
    field: axum::extract::multipart::Field<'_>,
    media_type: VideoMediaType,
) -> Result<Resource, ApiError> {
    let file = read_field(field, &media_type.as_str().to_lowercase())
        .await
        .map_err(|e| ApiError(VideoError::InvalidResource(e.to_string()).to_string(), e.status()))?;

    let allowed = match media_type.encodable() {
        Some(_) => [mime::VIDEO],
        None => [mime::IMAGE],
    };
    check_content_type(&file.content_type, &allowed)
        .map_err(|e| ApiError::from(VideoError::InvalidResource(e.to_string())))?;

    Ok(Resource::new(file.content, file.checksum, file.content_type, file.name))
}

/// Download a stored media file
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}/medias/{type}",
    params(
        ("id" = Uuid, Path, description = "Video ID"),
        ("type" = VideoMediaType, Path, description = "Media slot")
    ),
    responses(
        (status = 200, description = "Media content"),
        (status = 400, description = "Unknown media type"),
        (status = 404, description = "Media not found")
    ),
    tag = "Videos"
)]
pub async fn get_media(
    State(state): State<AppState>,
    Path((id, media_type)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    match state.get_media_service().execute(VideoId::from_uuid(id), &media_type).await {
        Ok(resource) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, resource.content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", resource.name.replace('"', "")),
                ),
            ],
            resource.content,
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
