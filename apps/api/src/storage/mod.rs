//! Object storage for uploaded binaries (resume documents, profile pictures).
//!
//! Handlers never talk to S3 directly; they go through the [`FileStore`]
//! carried in `AppState`, which keeps the ingestion pipeline testable.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod s3;

pub use s3::S3FileStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Backend(String),
}

/// An object read back from the store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Binary object store keyed by slash-separated paths.
///
/// `put` overwrites, `delete` is idempotent, `get` returns `None` for a
/// missing key rather than an error.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// `<user>/resumes/<resume id>.<ext>`
pub fn resume_path(user_id: &str, resume_id: uuid::Uuid, extension: &str) -> String {
    format!("{user_id}/resumes/{resume_id}.{extension}")
}

/// `<user>/profile/profile_picture`
pub fn profile_picture_path(user_id: &str) -> String {
    format!("{user_id}/profile/profile_picture")
}
