//! Ballot Storage - Key-value stores and the append-only command log.
//!
//! The ledger never persists derived tallies. It writes each committed
//! command to a [`CommandLog`] and rebuilds its state by replay.

pub mod error;
pub mod memory;
pub mod file_store;
pub mod command_log;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use file_store::FileStore;
pub use command_log::CommandLog;

/// Column-oriented key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, column: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&self, column: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    fn delete(&self, column: &str, key: &[u8]) -> Result<(), StorageError>;
}
