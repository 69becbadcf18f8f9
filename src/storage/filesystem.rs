use crate::storage::KeyValueStore;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::error;

/// Key-value store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    store_dir: PathBuf,
}

impl FileSystemStore {
    /// Creates a new FileSystemStore instance.
    /// Ensures the store directory exists.
    pub fn new<P: AsRef<Path>>(store_dir: P) -> Self {
        let path_buf = store_dir.as_ref().to_path_buf();
        // Async methods retry creation, so a failure here is only logged
        if let Err(e) = std::fs::create_dir_all(&path_buf) {
            error!(path = %path_buf.display(), error = %e, "Failed to create store directory during initialization");
        }
        Self { store_dir: path_buf }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Invalid store key '{}'", key);
        }
        Ok(self.store_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileSystemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::File::open(&path).await {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)
                    .await
                    .with_context(|| format!("Failed to read store file: {}", path.display()))?;
                Ok(Some(contents))
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to open store file: {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;

        // Ensure directory exists before writing
        if !self.store_dir.exists() {
            fs::create_dir_all(&self.store_dir)
                .await
                .with_context(|| format!("Failed to create store directory '{}'", self.store_dir.display()))?;
        }

        // Readers only ever see a complete value: write aside, then rename.
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path)
            .await
            .with_context(|| format!("Failed to create temporary store file: {}", tmp_path.display()))?;
        file.write_all(value.as_bytes())
            .await
            .with_context(|| format!("Failed to write to store file: {}", tmp_path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync store file: {}", tmp_path.display()))?;
        drop(file);

        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to replace store file: {}", path.display()))
    }
}
