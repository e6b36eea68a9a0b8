use super::{MediaStorage, StorageError, StorageResult};
use crate::modules::video::media::Resource;
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use tracing::{info, warn};

// Minimum part size for S3 is 5MB. We use 6MB to be safe.
const MIN_PART_SIZE: usize = 6 * 1024 * 1024;

const CHECKSUM_METADATA: &str = "checksum";
const NAME_METADATA: &str = "name";

#[derive(Clone)]
pub struct S3MediaStorage {
    client: Client,
    bucket: String,
}

impl S3MediaStorage {
    pub fn new(endpoint: &str, bucket: &str, access_key: &str, secret_key: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        info!("✅ Connected to S3 (MinIO) bucket {}", bucket);

        Self {
            client: Client::from_conf(config),
            bucket: bucket.to_string(),
        }
    }

    async fn put_object(&self, path: &str, resource: &Resource) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(&resource.content_type)
            .metadata(CHECKSUM_METADATA, &resource.checksum)
            .metadata(NAME_METADATA, &resource.name)
            .body(ByteStream::from(resource.content.clone()))
            .send()
            .await
            .map_err(|e| upload_failed(path, e))?;

        Ok(())
    }

    async fn multipart_upload(&self, path: &str, resource: &Resource) -> StorageResult<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(path)
            .content_type(&resource.content_type)
            .metadata(CHECKSUM_METADATA, &resource.checksum)
            .metadata(NAME_METADATA, &resource.name)
            .send()
            .await
            .map_err(|e| upload_failed(path, e))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| upload_failed(path, "missing upload id"))?
            .to_string();

        match self.upload_parts(path, &upload_id, &resource.content).await {
            Ok(parts) => self.complete_multipart_upload(path, &upload_id, parts).await,
            Err(e) => {
                if let Err(abort) = self.abort_multipart_upload(path, &upload_id).await {
                    warn!("Failed to abort multipart upload {}: {}", upload_id, abort);
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(&self, path: &str, upload_id: &str, content: &Bytes) -> StorageResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();

        for (index, chunk) in content.chunks(MIN_PART_SIZE).enumerate() {
            let part_number = (index + 1) as i32;
            let result = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(path)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(content.slice_ref(chunk)))
                .send()
                .await
                .map_err(|e| upload_failed(path, e))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(result.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
        }

        Ok(parts)
    }

    async fn complete_multipart_upload(&self, path: &str, upload_id: &str, parts: Vec<CompletedPart>) -> StorageResult<()> {
        let completed = CompletedMultipartUpload::builder().set_parts(Some(parts)).build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(path)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| upload_failed(path, e))?;

        Ok(())
    }

    async fn abort_multipart_upload(&self, path: &str, upload_id: &str) -> StorageResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(path)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| upload_failed(path, e))?;

        Ok(())
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn store(&self, path: &str, resource: &Resource) -> StorageResult<()> {
        if resource.content.len() > MIN_PART_SIZE {
            self.multipart_upload(path, resource).await
        } else {
            self.put_object(path, resource).await
        }
    }

    async fn get(&self, path: &str) -> StorageResult<Option<Resource>> {
        let output = match self.client.get_object().bucket(&self.bucket).key(path).send().await {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|s| s.is_no_such_key()) => return Ok(None),
            Err(e) => {
                return Err(StorageError::DownloadFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let metadata = output.metadata().cloned().unwrap_or_default();
        let content_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let content = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            })?
            .into_bytes();

        Ok(Some(Resource {
            content,
            checksum: metadata.get(CHECKSUM_METADATA).cloned().unwrap_or_default(),
            content_type,
            name: metadata.get(NAME_METADATA).cloned().unwrap_or_default(),
        }))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn delete_all(&self, paths: &[String]) -> StorageResult<()> {
        for path in paths {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(path)
                .send()
                .await
                .map_err(|e| StorageError::DeleteFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }
}

fn upload_failed(path: &str, reason: impl ToString) -> StorageError {
    StorageError::UploadFailed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
