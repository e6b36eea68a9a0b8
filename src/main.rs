use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::settings::{AppConfig, StorageBackend};
use crate::infrastructure::db::pool::{connect_to_db, run_migrations};
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::infrastructure::storage::memory::InMemoryMediaStorage;
use crate::infrastructure::storage::s3::S3MediaStorage;
use crate::infrastructure::storage::MediaStorage;
use crate::modules::video::gateway::MediaResourceGateway;
use crate::modules::video::repository::PgVideoRepository;
use crate::state::AppState;
use crate::workers::encoder_listener::{start_encoder_listener, EncoderListener};

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    info!("Starting catalog admin...");

    let config = AppConfig::new().context("Missing required configuration")?;

    let db = connect_to_db(&config.database_url).await?;
    run_migrations(&db).await.context("Failed to run migrations")?;

    let storage: Arc<dyn MediaStorage> = match (&config.storage.backend, &config.storage.s3) {
        (StorageBackend::S3, Some(s3)) => Arc::new(S3MediaStorage::new(
            &s3.url,
            &s3.bucket,
            &s3.access_key,
            &s3.secret_key,
        )),
        _ => Arc::new(InMemoryMediaStorage::new()),
    };
    let media = MediaResourceGateway::new(
        storage,
        &config.storage.location_pattern,
        &config.storage.filename_pattern,
    );

    let rabbit = RabbitMqService::new(&config.amqp.url).await?;

    let state = AppState::new(
        config.clone(),
        Arc::new(PgVideoRepository::new(db)),
        media,
        Arc::new(rabbit.clone()),
    );

    start_encoder_listener(
        rabbit,
        EncoderListener::new(state.update_media_status_service()),
        config.amqp.video_encoded_queue.clone(),
        config.amqp.consumers,
    )
    .await?;

    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
