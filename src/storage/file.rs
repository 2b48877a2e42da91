// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON file backed key-value store.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::KeyValueStore;

/// File name inside the data directory.
const STORE_FILE: &str = "storage.json";

/// Key-value pairs persisted as a single JSON object.
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Create or open the store in a data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(STORE_FILE);

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Corrupt store file {:?}", path))?
        } else {
            BTreeMap::new()
        };
        debug!("Opened key-value store at {:?}", path);

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save to disk.
    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save(&values) {
            // Keep memory in step with disk
            match previous {
                Some(v) => values.insert(key.to_string(), v),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if let Some(previous) = values.remove(key) {
            if let Err(e) = self.save(&values) {
                values.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        store.set("unique_device_id", "abc").unwrap();
        drop(store);

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get("unique_device_id").unwrap().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        drop(store);

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "not json").unwrap();

        assert!(JsonFileStore::open(dir.path()).is_err());
    }
}
