// src/storage/mod.rs
pub mod s3;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("URL generation failed: {0}")]
    UrlGeneration(String),
}

/// Bucket-backed file storage. Returned references are opaque object keys,
/// valid as input to every other method.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        folder: &str,
        object_id: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn download(&self, file_url: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, file_url: &str) -> Result<(), StorageError>;

    /// Time-limited signed GET link for handing the file to a browser.
    async fn presigned_url(
        &self,
        file_url: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
