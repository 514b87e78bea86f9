//! In-memory store, used by tests and by nodes running without persistence.

use crate::{KeyValueStore, StorageError};
use parking_lot::RwLock;
use std::collections::HashMap;

type Column = HashMap<Vec<u8>, Vec<u8>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    columns: RwLock<HashMap<String, Column>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in a column.
    pub fn len(&self, column: &str) -> usize {
        self.columns.read().get(column).map(|c| c.len()).unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, column: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .columns
            .read()
            .get(column)
            .and_then(|c| c.get(key))
            .cloned())
    }

    fn put(&self, column: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.columns
            .write()
            .entry(column.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, column: &str, key: &[u8]) -> Result<(), StorageError> {
        if let Some(c) = self.columns.write().get_mut(column) {
            c.remove(key);
        }
        Ok(())
    }
}
