use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::{
    errors::{ProgressError, Result},
    logvbln,
};

use super::BlobStore;

/// Keeps each blob as a file under `root`. Used for local runs.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    const CC: &'static str = "LocalStore";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        logvbln!("read {}", path.display());

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ProgressError::Storage(format!("read {}: {}", path.display(), err))),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.path(key);
        logvbln!("write {} ({} bytes)", path.display(), body.len());

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| ProgressError::Storage(format!("mkdir {}: {}", self.root.display(), err)))?;

        tokio::fs::write(&path, body)
            .await
            .map_err(|err| ProgressError::Storage(format!("write {}: {}", path.display(), err)))
    }
}
