use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};

use crate::{
    errors::{ProgressError, Result},
    logvbln,
};

use super::BlobStore;

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    const CC: &'static str = "S3Store";

    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    /// Client configured from the ambient AWS environment.
    pub async fn from_env(bucket: &str) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        logvbln!("get s3://{}/{}", self.bucket, key);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(ProgressError::Storage(format!(
                    "get s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&service_err)
                )));
            }
        };

        let body = output.body.collect().await.map_err(|err| {
            ProgressError::Storage(format!("reading s3://{}/{}: {}", self.bucket, key, err))
        })?;

        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        logvbln!("put s3://{}/{} ({} bytes)", self.bucket, key, body.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("text/csv")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                ProgressError::Storage(format!(
                    "put s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&err)
                ))
            })?;

        Ok(())
    }
}
