//! Object storage for uploaded garden and specimen media
//!
//! Services depend on the `ObjectStorage` trait; the MinIO client is the
//! production implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object, returning its key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Object key for a new media file under the configured prefix
    fn media_key(&self, folder: &str, file_name: &str) -> String;

    /// Publicly reachable URL for a stored key
    fn public_url(&self, key: &str) -> String;
}
