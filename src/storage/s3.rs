// src/storage/s3.rs
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

use super::{ObjectStore, StorageError};
use crate::config::Config;

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(config: &Config) -> Self {
        let endpoint = if !config.s3_endpoint.ends_with('/') {
            format!("{}/", config.s3_endpoint)
        } else {
            config.s3_endpoint.clone()
        };

        let base_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(aws_config::Region::new(config.s3_region.clone()))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                config.s3_access_key.clone(),
                config.s3_secret_key.clone(),
                None,
                None,
                "static",
            ))
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&base_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.s3_bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        folder: &str,
        object_id: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = format!("{}/{}", folder, object_id);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload {}: {}", key, e);
                StorageError::Upload(e.to_string())
            })?;

        tracing::info!("File uploaded successfully: {} ({} bytes)", key, size);
        Ok(key)
    }

    async fn download(&self, file_url: &str) -> Result<Vec<u8>, StorageError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(file_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to download {}: {}", file_url, e);
                StorageError::Download(e.to_string())
            })?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Download(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn delete(&self, file_url: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(file_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {}: {}", file_url, e);
                StorageError::Delete(e.to_string())
            })?;

        tracing::info!("File deleted successfully: {}", file_url);
        Ok(())
    }

    async fn presigned_url(
        &self,
        file_url: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::UrlGeneration(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(file_url)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!("Failed to presign {}: {}", file_url, e);
                StorageError::UrlGeneration(e.to_string())
            })?;

        Ok(request.uri().to_string())
    }
}
