//! Implements the `BlobStore` trait with one JSON file per key inside a directory.

use crate::store::BlobStore;
use crate::{utils, Result};
use anyhow::{ensure, Context};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Stores each blob as `<dir>/<key>.json`. Writes land in a sibling temp file first and are then
/// renamed over the target.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that holds the blob stored under `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        ensure!(!key.is_empty(), "A storage key cannot be empty");
        ensure!(
            key.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                && !key.starts_with('.'),
            "Invalid storage key '{key}': use letters, digits, '-', '_' or '.'"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl BlobStore for FileBlobStore {
    async fn read(&mut self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        trace!("read blob {}", path.display());
        utils::read_optional(&path).await
    }

    async fn write(&mut self, key: &str, data: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        trace!("write {} bytes to {}", data.len(), path.display());
        utils::write(&tmp, data).await?;
        utils::rename(&tmp, &path)
            .await
            .with_context(|| format!("Unable to replace the snapshot for '{key}'"))
    }
}
