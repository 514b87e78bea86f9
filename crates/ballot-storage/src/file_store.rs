//! JSON file-backed store.
//!
//! Keys and values are hex-encoded into a single `data.json`, rewritten on
//! every write through a temp file and rename.

use crate::{KeyValueStore, StorageError};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DATA_FILE: &str = "data.json";

pub struct FileStore {
    path: PathBuf,
    data: Arc<RwLock<serde_json::Value>>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(path)?;

        let data_file = path.join(DATA_FILE);
        let data = if data_file.exists() {
            let content = fs::read_to_string(&data_file)?;
            serde_json::from_str(&content).map_err(|e| {
                StorageError::Corrupt(format!("{}: {}", data_file.display(), e))
            })?
        } else {
            serde_json::json!({})
        };

        tracing::debug!("Opened file store at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &serde_json::Value) -> Result<(), StorageError> {
        let data_file = self.path.join(DATA_FILE);
        let tmp_file = self.path.join(format!("{}.tmp", DATA_FILE));
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, &data_file)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, column: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read();
        let key_hex = hex::encode(key);

        match data.get(column).and_then(|c| c.get(&key_hex)).and_then(|v| v.as_str()) {
            Some(value) => Ok(Some(
                hex::decode(value).map_err(|e| StorageError::Serialization(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    fn put(&self, column: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let key_hex = hex::encode(key);
        let value_hex = hex::encode(value);

        let mut data = self.data.write();
        let previous = data.clone();

        if !data.is_object() {
            *data = serde_json::json!({});
        }
        if let Some(root) = data.as_object_mut() {
            let columns = root
                .entry(column.to_string())
                .or_insert_with(|| serde_json::json!({}));
            if let Some(obj) = columns.as_object_mut() {
                obj.insert(key_hex, serde_json::json!(value_hex));
            }
        }

        // Memory only moves forward once the file write landed
        if let Err(e) = self.persist(&data) {
            *data = previous;
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, column: &str, key: &[u8]) -> Result<(), StorageError> {
        let key_hex = hex::encode(key);

        let mut data = self.data.write();
        let previous = data.clone();
        if let Some(obj) = data.get_mut(column).and_then(|c| c.as_object_mut()) {
            obj.remove(&key_hex);
        }

        if let Err(e) = self.persist(&data) {
            *data = previous;
            return Err(e);
        }
        Ok(())
    }
}
