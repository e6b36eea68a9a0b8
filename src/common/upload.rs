use anyhow::{anyhow, Result};
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::error;

/// A file part read fully into memory, with its SHA-256 hex digest.
#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub checksum: String,
    pub content: Bytes,
}

/// Accepts `content_type` when its top-level type matches one of `allowed`, e.g. `video` or `image`.
pub fn check_content_type(content_type: &str, allowed: &[mime::Name<'_>]) -> Result<mime::Mime> {
    let parsed: mime::Mime = content_type
        .parse()
        .map_err(|_| anyhow!("Invalid content type: {}", content_type))?;

    if allowed.contains(&parsed.type_()) {
        Ok(parsed)
    } else {
        let allowed = allowed.iter().map(|t| format!("{}/*", t)).collect::<Vec<_>>().join(", ");
        Err(anyhow!("Invalid content type {}: only {} allowed", content_type, allowed))
    }
}

/// Failure while reading a multipart file part.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Stream interrupted: {0}")]
    Stream(#[from] MultipartError),

    #[error("Uploaded file {0} is empty")]
    Empty(String),
}

impl UploadError {
    /// Oversized bodies keep the 413 the multipart reader reports for them.
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Stream(e) => e.status(),
            UploadError::Empty(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Reads the part into memory, hashing each chunk as it arrives.
pub async fn read_field(mut field: Field<'_>, fallback_name: &str) -> Result<UploadedFile, UploadError> {
    let name = field.file_name().unwrap_or(fallback_name).to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut buffer = BytesMut::new();
    let mut hasher = Sha256::new();

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                hasher.update(&chunk);
                buffer.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => {
                error!("Stream error: {}", e);
                return Err(UploadError::Stream(e));
            }
        }
    }

    if buffer.is_empty() {
        return Err(UploadError::Empty(name));
    }

    Ok(UploadedFile {
        name,
        content_type,
        checksum: hex::encode(hasher.finalize()),
        content: buffer.freeze(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uploads_are_bad_requests() {
        let e = UploadError::Empty("movie.mp4".to_string());

        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "Uploaded file movie.mp4 is empty");
    }

    #[test]
    fn content_type_must_match_allowed_top_level_type() {
        assert!(check_content_type("video/mp4", &[mime::VIDEO]).is_ok());
        assert!(check_content_type("image/png", &[mime::IMAGE]).is_ok());
        assert!(check_content_type("image/png", &[mime::VIDEO]).is_err());
        assert!(check_content_type("application/pdf", &[mime::VIDEO, mime::IMAGE]).is_err());
        assert!(check_content_type("not a mime", &[mime::VIDEO]).is_err());
    }
}
