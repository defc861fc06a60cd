use crate::store::Storage;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Durable storage backed by a fjall keyspace in the data directory.
///
/// Every write is persisted synchronously so the store survives abrupt
/// termination at the cost of a fsync per mutation, which is negligible at
/// the write rates of a hand-edited ledger.
pub struct FjallStorage {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallStorage {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace
            .open_partition("finboard", PartitionCreateOptions::default())
            .context("Failed to open finboard partition")?;

        Ok(Self { keyspace, partition })
    }
}

impl Storage for FjallStorage {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(value) => value.map(|slice| slice.to_vec()),
            Err(e) => {
                debug!("Storage read error for key {key}: {e}");
                None
            }
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.partition
            .insert(key, bytes)
            .with_context(|| format!("Failed to write key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        Ok(())
    }
}
