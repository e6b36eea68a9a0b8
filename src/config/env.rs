use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    StorageBackend,
    StorageLocationPattern,
    StorageFilenamePattern,
    MinioUrl,
    MinioBucket,
    MinioAccessKey,
    MinioSecretKey,
    AmqpUrl,
    AmqpVideoEncodedQueue,
    AmqpVideoCreatedQueue,
    AmqpConsumers,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::StorageBackend => "STORAGE_BACKEND",
            EnvKey::StorageLocationPattern => "STORAGE_LOCATION_PATTERN",
            EnvKey::StorageFilenamePattern => "STORAGE_FILENAME_PATTERN",
            EnvKey::MinioUrl => "MINIO_ENDPOINT",
            EnvKey::MinioBucket => "MINIO_BUCKET_VIDEOS",
            EnvKey::MinioAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::MinioSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::AmqpUrl => "AMQP_URL",
            EnvKey::AmqpVideoEncodedQueue => "AMQP_VIDEO_ENCODED_QUEUE",
            EnvKey::AmqpVideoCreatedQueue => "AMQP_VIDEO_CREATED_QUEUE",
            EnvKey::AmqpConsumers => "AMQP_CONSUMERS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
