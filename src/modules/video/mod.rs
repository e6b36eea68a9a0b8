use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub mod dto;
pub mod error;
pub mod events;
pub mod gateway;
pub mod handler;
pub mod media;
pub mod model;
pub mod repository;
pub mod service;
pub mod status;
pub mod upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_video))
        .route(
            "/{id}",
            get(handler::get_video)
                .put(handler::update_video)
                .delete(handler::delete_video),
        )
        .route(
            "/{id}/medias/{type}",
            post(handler::upload_media).get(handler::get_media),
        )
}
