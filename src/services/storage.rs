// src/services/storage.rs
//! Hosted object store client (S3) for avatar blobs
//!
//! The store is optional: without credentials every call reports
//! NotConfigured quickly and callers fall back to local disk.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use std::env;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store credentials not configured")]
    NotConfigured,

    #[error("object store operation failed: {0}")]
    S3Error(String),

    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    /// Optional CDN/custom domain serving the bucket
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Read the store configuration from the environment; `None` when the
    /// credentials are absent
    pub fn from_env() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;

        Some(Self {
            access_key_id,
            secret_access_key,
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("AVATARS_BUCKET").unwrap_or_default(),
            public_base_url: env::var("AVATARS_PUBLIC_BASE_URL").ok(),
        })
    }
}

#[derive(Debug)]
pub struct StorageService {
    config: Option<StorageConfig>,
}

impl StorageService {
    pub fn new(config: Option<StorageConfig>) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config
            .as_ref()
            .map(|c| !c.bucket.is_empty())
            .unwrap_or(false)
    }

    fn config(&self) -> Result<&StorageConfig, StorageError> {
        self.config.as_ref().ok_or(StorageError::NotConfigured)
    }

    async fn get_s3_client(&self) -> Result<(S3Client, String), StorageError> {
        let config = self.config()?;

        if config.bucket.is_empty() {
            return Err(StorageError::InvalidConfig(
                "avatar bucket name not configured".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "environment",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok((S3Client::new(&aws_config), config.bucket.clone()))
    }

    /// Upload an object and return its public URL
    pub async fn upload_object(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let (client, bucket) = self.get_s3_client().await?;

        let body = ByteStream::from(Bytes::from(data));

        client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload object to store");
                StorageError::S3Error(format!("Upload failed: {}", e))
            })?;

        let url = self.object_url(key)?;

        info!(key = %key, bucket = %bucket, "Object uploaded to store successfully");
        Ok(url)
    }

    /// Public URL for a stored object (custom domain when configured,
    /// standard bucket URL otherwise)
    pub fn object_url(&self, key: &str) -> Result<String, StorageError> {
        let config = self.config()?;

        if let Some(base) = &config.public_base_url {
            return Ok(format!("{}/{}", base.trim_end_matches('/'), key));
        }

        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            config.bucket, config.region, key
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StorageConfig {
        StorageConfig {
            access_key_id: "test_key".to_string(),
            secret_access_key: "test_secret".to_string(),
            region: "us-east-1".to_string(),
            bucket: "studio-avatars".to_string(),
            public_base_url: None,
        }
    }

    #[test]
    fn test_unconfigured_service_reports_not_configured() {
        let service = StorageService::new(None);
        assert!(!service.is_configured());
        assert!(matches!(
            service.object_url("avatars/x.png"),
            Err(StorageError::NotConfigured)
        ));
    }

    #[test]
    fn test_object_url_standard() {
        let service = StorageService::new(Some(test_config()));
        assert!(service.is_configured());
        assert_eq!(
            service.object_url("avatars/u1-123.png").unwrap(),
            "https://studio-avatars.s3.us-east-1.amazonaws.com/avatars/u1-123.png"
        );
    }

    #[test]
    fn test_object_url_with_public_base() {
        let mut config = test_config();
        config.public_base_url = Some("https://cdn.example.com/".to_string());
        let service = StorageService::new(Some(config));
        assert_eq!(
            service.object_url("avatars/u1-123.png").unwrap(),
            "https://cdn.example.com/avatars/u1-123.png"
        );
    }

    #[test]
    fn test_empty_bucket_counts_as_unconfigured() {
        let mut config = test_config();
        config.bucket = String::new();
        let service = StorageService::new(Some(config));
        assert!(!service.is_configured());
    }
}
