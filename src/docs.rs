use utoipa::OpenApi;
use crate::modules::video::dto::*;
use crate::modules::video::media::{MediaStatus, VideoMediaType};
use crate::modules::video::model::Rating;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::create_video,
        crate::modules::video::handler::get_video,
        crate::modules::video::handler::update_video,
        crate::modules::video::handler::delete_video,
        crate::modules::video::handler::upload_media,
        crate::modules::video::handler::get_media,
    ),
    components(
        schemas(
            VideoRequest, VideoResponse, AudioVideoMediaResponse, ImageMediaResponse,
            UploadMediaResponse, VideoMediaType, MediaStatus, Rating,
        )
    ),
    tags(
        (name = "Videos", description = "Video catalog and media management")
    )
)]
pub struct ApiDoc;
