pub mod disk;
pub mod memory;

use anyhow::Result;

/// Key under which the serialized ledger blob is stored.
pub const LEDGER_KEY: &str = "ledger";

/// Key under which the currency-pair watchlist is stored.
pub const PAIRS_KEY: &str = "currency-pairs";

/// Durable key-value blobs backing the record stores.
///
/// The production backend is a fjall keyspace under the data directory;
/// tests inject [`memory::MemoryStorage`] to stay off the filesystem.
pub trait Storage: Send + Sync {
    /// Returns the blob stored under `key`, or `None` when absent or
    /// unreadable. Read failures degrade to "no data" so a corrupt store
    /// never takes the application down.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}
