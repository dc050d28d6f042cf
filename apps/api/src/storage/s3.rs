use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{debug, info};

use super::{FileStore, StorageError, StoredObject};

/// S3 / MinIO backed [`FileStore`]. All objects live in one bucket.
#[derive(Clone)]
pub struct S3FileStore {
    client: S3Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {}", DisplayErrorContext(&e))))?;

        info!("Uploaded s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().map(|e| e.is_no_such_key()) == Some(true) {
                    debug!("s3://{}/{} does not exist", self.bucket, path);
                    return Ok(None);
                }
                return Err(StorageError::Backend(format!(
                    "S3 download failed: {}",
                    DisplayErrorContext(&err)
                )));
            }
        };

        let content_type = output.content_type().map(String::from);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 body read failed: {e}")))?
            .into_bytes();

        Ok(Some(StoredObject {
            bytes,
            content_type,
        }))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 delete failed: {}", DisplayErrorContext(&e))))?;

        info!("Deleted s3://{}/{}", self.bucket, path);
        Ok(())
    }
}
