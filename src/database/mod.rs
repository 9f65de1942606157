use async_trait::async_trait;

use crate::errors::Result;

pub mod local;
pub mod progress_log;
pub mod s3;

/// Named-blob storage the progress log lives in.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` when no blob exists under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrites whatever is stored under `key`.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;
}
