use crate::store::Storage;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend, used by tests and as a fallback when no data
/// directory is available.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().unwrap().get(key).cloned()
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
