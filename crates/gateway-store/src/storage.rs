//! Persistence port over named text slots, with memory and file backends.

use crate::error::GatewayError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Slot holding the ordered list of payment requests.
pub const GATEWAYS_SLOT: &str = "OrangeGateways";

/// Slot holding the id -> stats map.
pub const STATS_SLOT: &str = "OrangeGatewayStats";

/// Key-value persistence for the gateway store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a slot. `None` when the slot has never been written.
    async fn load(&self, slot: &str) -> Result<Option<String>, GatewayError>;

    /// Overwrite a slot.
    async fn save(&self, slot: &str, value: &str) -> Result<(), GatewayError>;

    /// Write several slots as one update.
    async fn save_all(&self, entries: &[(&str, String)]) -> Result<(), GatewayError> {
        for (slot, value) in entries {
            self.save(slot, value).await?;
        }
        Ok(())
    }
}

/// In-process storage. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate slots, e.g. with data written by an earlier session.
    pub fn with_slots<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            slots: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, slot: &str) -> Result<Option<String>, GatewayError> {
        Ok(self.slots.read().await.get(slot).cloned())
    }

    async fn save(&self, slot: &str, value: &str) -> Result<(), GatewayError> {
        self.slots
            .write()
            .await
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load(&self, slot: &str) -> Result<Option<String>, GatewayError> {
        let path = self.slot_path(slot);
        if !path.exists() {
            debug!("Slot {} not found at {:?}", slot, path);
            return Ok(None);
        }

        let text = fs::read_to_string(&path).await?;
        Ok(Some(text))
    }

    async fn save(&self, slot: &str, value: &str) -> Result<(), GatewayError> {
        fs::create_dir_all(&self.dir).await?;

        // Write atomically using temp file + rename
        let path = self.slot_path(slot);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &path).await?;

        debug!("Saved slot {} ({} bytes) to {:?}", slot, value.len(), path);
        Ok(())
    }

    /// Stage every slot as a temp file before renaming any of them, so a
    /// failed write leaves all slots at their previous contents.
    async fn save_all(&self, entries: &[(&str, String)]) -> Result<(), GatewayError> {
        fs::create_dir_all(&self.dir).await?;

        let mut staged = Vec::with_capacity(entries.len());
        for (slot, value) in entries {
            let path = self.slot_path(slot);
            let temp_path = path.with_extension("tmp");
            if let Err(e) = fs::write(&temp_path, value).await {
                for (temp, _) in &staged {
                    let _ = fs::remove_file(temp).await;
                }
                return Err(e.into());
            }
            staged.push((temp_path, path));
        }

        for (temp_path, path) in &staged {
            fs::rename(temp_path, path).await?;
        }

        debug!("Saved {} slots to {:?}", staged.len(), self.dir);
        Ok(())
    }
}
