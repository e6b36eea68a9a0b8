use axum::extract::DefaultBodyLimit;
use axum::Router;
use crate::state::AppState;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    crate::routes::configure_routes()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
