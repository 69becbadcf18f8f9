use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::prompt::PromptRecord;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemStore;
pub use memory::MemoryStore;

/// Well-known key the prompt history lives under.
pub const HISTORY_KEY: &str = "promptHistory";

/// Layout version written by this crate.
pub const HISTORY_VERSION: u32 = 1;

/// Trait defining the interface for local key-value backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Serialize)]
struct HistoryDocumentRef<'a> {
    version: u32,
    records: &'a [PromptRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryDocument {
    Versioned {
        version: u32,
        records: Vec<PromptRecord>,
    },
    /// Unversioned layout: a bare array of records.
    Legacy(Vec<PromptRecord>),
}

/// Ordered list of saved prompts, most recent first.
///
/// There is no in-memory cache: every call reads or rewrites the whole list
/// under [`HISTORY_KEY`], so the backend is always authoritative.
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> Result<Vec<PromptRecord>> {
        let Some(raw) = self.backend.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw).context("Failed to deserialize prompt history")? {
            HistoryDocument::Versioned { version, records } => {
                if version > HISTORY_VERSION {
                    bail!(
                        "Prompt history was written by a newer version (layout {}, supported {})",
                        version,
                        HISTORY_VERSION
                    );
                }
                Ok(records)
            }
            HistoryDocument::Legacy(records) => {
                debug!(count = records.len(), "Read unversioned prompt history");
                Ok(records)
            }
        }
    }

    /// Prepends `record`.
    pub async fn append(&self, record: PromptRecord) -> Result<()> {
        let mut records = self.list().await?;
        let id = record.id.clone();
        records.insert(0, record);
        self.write(&records).await?;
        info!(id = %id, count = records.len(), "Prompt saved to history");
        Ok(())
    }

    /// Removes the record with `id`. Returns false (and writes nothing) if
    /// no such record exists.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.list().await?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            debug!(id, "Prompt not in history, nothing to remove");
            return Ok(false);
        }
        self.write(&records).await?;
        info!(id, count = records.len(), "Prompt removed from history");
        Ok(true)
    }

    async fn write(&self, records: &[PromptRecord]) -> Result<()> {
        let document = HistoryDocumentRef {
            version: HISTORY_VERSION,
            records,
        };
        let contents =
            serde_json::to_string(&document).context("Failed to serialize prompt history")?;
        self.backend
            .set(HISTORY_KEY, &contents)
            .await
            .context("Failed to persist prompt history")
    }
}
