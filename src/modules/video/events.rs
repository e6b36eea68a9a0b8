use super::model::VideoId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Published when a raw audio/video file is waiting for the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMediaCreated {
    pub video_id: VideoId,
    pub resource_id: String,
    pub file_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_on: OffsetDateTime,
}

impl VideoMediaCreated {
    pub fn new(video_id: VideoId, resource_id: &str, file_path: &str) -> Self {
        Self {
            video_id,
            resource_id: resource_id.to_string(),
            file_path: file_path.to_string(),
            occurred_on: OffsetDateTime::now_utc(),
        }
    }
}

// Encoder result messages, as produced by the external encoder.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum VideoEncoderResult {
    #[serde(rename = "COMPLETED")]
    Completed(VideoEncoderCompleted),
    #[serde(rename = "ERROR")]
    Error(VideoEncoderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEncoderCompleted {
    pub id: String,
    #[serde(default, alias = "outputBucketPath", skip_serializing_if = "Option::is_none")]
    pub output_bucket_path: Option<String>,
    pub video: VideoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(alias = "encodedVideoFolder")]
    pub encoded_video_folder: String,
    #[serde(alias = "resourceId")]
    pub resource_id: String,
    #[serde(alias = "filePath")]
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEncoderError {
    #[serde(default)]
    pub message: Option<VideoMessage>,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMessage {
    #[serde(alias = "resourceId")]
    pub resource_id: String,
    #[serde(alias = "filePath")]
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_completed_result() {
        let payload = r#"{
            "status": "COMPLETED",
            "id": "4a1f1b3a-5d8e-4f59-9a0c-2f9f0f0b8f9e",
            "output_bucket_path": "codeeducationtest",
            "video": {
                "encoded_video_folder": "anyfolder",
                "resource_id": "r1",
                "file_path": "any.mp4"
            }
        }"#;

        let result: VideoEncoderResult = serde_json::from_str(payload).unwrap();

        let VideoEncoderResult::Completed(completed) = result else {
            panic!("expected a completed result");
        };
        assert_eq!(completed.id, "4a1f1b3a-5d8e-4f59-9a0c-2f9f0f0b8f9e");
        assert_eq!(completed.output_bucket_path.as_deref(), Some("codeeducationtest"));
        assert_eq!(completed.video.encoded_video_folder, "anyfolder");
        assert_eq!(completed.video.resource_id, "r1");
        assert_eq!(completed.video.file_path, "any.mp4");
    }

    #[test]
    fn accepts_camel_case_metadata_fields() {
        let payload = r#"{"status":"COMPLETED","id":"v1","video":{"resourceId":"r1","encodedVideoFolder":"enc","filePath":"v1.mp4"}}"#;

        let result: VideoEncoderResult = serde_json::from_str(payload).unwrap();

        assert_eq!(
            result,
            VideoEncoderResult::Completed(VideoEncoderCompleted {
                id: "v1".to_string(),
                output_bucket_path: None,
                video: VideoMetadata {
                    encoded_video_folder: "enc".to_string(),
                    resource_id: "r1".to_string(),
                    file_path: "v1.mp4".to_string(),
                },
            })
        );
    }

    #[test]
    fn decodes_error_result() {
        let payload = r#"{"status":"ERROR","message":{"resource_id":"123","file_path":"abc"},"error":"Video not found"}"#;

        let result: VideoEncoderResult = serde_json::from_str(payload).unwrap();

        let VideoEncoderResult::Error(error) = result else {
            panic!("expected an error result");
        };
        assert_eq!(error.error, "Video not found");
        assert_eq!(error.message.map(|m| m.resource_id).as_deref(), Some("123"));
    }

    #[test]
    fn error_result_serializes_with_status_tag() {
        let result = VideoEncoderResult::Error(VideoEncoderError {
            message: Some(VideoMessage {
                resource_id: "123".to_string(),
                file_path: "abc".to_string(),
            }),
            error: "boom".to_string(),
        });

        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "ERROR");
        assert_eq!(value["message"]["resource_id"], "123");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let payload = r#"{"status":"PENDING","id":"v1"}"#;

        assert!(serde_json::from_str::<VideoEncoderResult>(payload).is_err());
    }
}
