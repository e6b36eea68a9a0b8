use serde::Deserialize;
use crate::config::env::{self, EnvKey};

/// Uploads are buffered in memory, one copy per request in flight.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 128 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => StorageBackend::Memory,
            _ => StorageBackend::S3,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct S3Config {
    pub url: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub location_pattern: String,
    pub filename_pattern: String,
    /// Only present when `backend` is `S3`.
    pub s3: Option<S3Config>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AmqpConfig {
    pub url: String,
    pub video_encoded_queue: String,
    pub video_created_queue: String,
    pub consumers: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub storage: StorageConfig,
    pub amqp: AmqpConfig,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        let backend = StorageBackend::parse(&env::get_or(EnvKey::StorageBackend, "s3"));

        let s3 = match backend {
            StorageBackend::S3 => Some(S3Config {
                url: env::get(EnvKey::MinioUrl)?,
                bucket: env::get(EnvKey::MinioBucket)?,
                access_key: env::get(EnvKey::MinioAccessKey)?,
                secret_key: env::get(EnvKey::MinioSecretKey)?,
            }),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            storage: StorageConfig {
                backend,
                location_pattern: env::get_or(EnvKey::StorageLocationPattern, "videoId-{videoId}"),
                filename_pattern: env::get_or(EnvKey::StorageFilenamePattern, "type-{type}"),
                s3,
            },
            amqp: AmqpConfig {
                url: env::get(EnvKey::AmqpUrl)?,
                video_encoded_queue: env::get_or(EnvKey::AmqpVideoEncodedQueue, "video.encoded.queue"),
                video_created_queue: env::get_or(EnvKey::AmqpVideoCreatedQueue, "video.created.queue"),
                consumers: env::get_parsed(EnvKey::AmqpConsumers, 4usize).max(1),
            },
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}
