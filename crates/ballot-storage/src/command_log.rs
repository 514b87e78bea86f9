//! Append-only command log over any [`KeyValueStore`].
//!
//! Records live in the `commands` column under their big-endian sequence
//! number. The `meta/head` key holds the number of committed records and is
//! written after the record itself, so a record without a head bump is
//! ignored on replay and overwritten by the next append.

use crate::{KeyValueStore, StorageError};
use parking_lot::Mutex;
use std::sync::Arc;

const COMMANDS: &str = "commands";
const META: &str = "meta";
const HEAD_KEY: &[u8] = b"head";

pub struct CommandLog {
    store: Arc<dyn KeyValueStore>,
    head: Mutex<u64>,
}

impl CommandLog {
    /// Open the log stored in `store`, reading its committed length.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let head = match store.get(META, HEAD_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::Corrupt(format!("head has {} bytes, expected 8", bytes.len()))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };

        tracing::debug!("Command log opened with {} records", head);

        Ok(Self {
            store,
            head: Mutex::new(head),
        })
    }

    /// Append one record; returns its sequence number.
    pub fn append(&self, record: &[u8]) -> Result<u64, StorageError> {
        let mut head = self.head.lock();
        let seq = *head;

        self.store.put(COMMANDS, &seq.to_be_bytes(), record)?;
        self.store.put(META, HEAD_KEY, &(seq + 1).to_be_bytes())?;
        *head = seq + 1;

        Ok(seq)
    }

    pub fn len(&self) -> u64 {
        *self.head.lock()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All committed records in append order.
    pub fn read_all(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        let head = *self.head.lock();
        let mut records = Vec::with_capacity(head as usize);

        for seq in 0..head {
            let record = self
                .store
                .get(COMMANDS, &seq.to_be_bytes())?
                .ok_or_else(|| StorageError::Corrupt(format!("missing record {}", seq)))?;
            records.push(record);
        }

        Ok(records)
    }
}
