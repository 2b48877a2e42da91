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

//! Per-install device identifier.

use anyhow::{Context, Result};
use tracing::{error, info};
use uuid::Uuid;

use crate::storage::KeyValueStore;

/// Key the identifier is persisted under.
pub const DEVICE_ID_KEY: &str = "unique_device_id";

/// Creates the identifier once and hands back the same value afterwards.
pub struct IdentityStore<S> {
    store: S,
}

impl<S: KeyValueStore> IdentityStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the stored identifier, generating and persisting one if absent.
    pub fn get_or_create_id(&self) -> Result<String> {
        self.load_or_generate().map_err(|e| {
            error!("Error managing device ID: {:#}", e);
            e.context("Failed to get device ID")
        })
    }

    fn load_or_generate(&self) -> Result<String> {
        if let Some(id) = self.store.get(DEVICE_ID_KEY)? {
            if !id.is_empty() {
                return Ok(id);
            }
        }

        let id = Uuid::new_v4().to_string();
        self.store
            .set(DEVICE_ID_KEY, &id)
            .context("Failed to persist device ID")?;
        info!("Generated new device ID");
        Ok(id)
    }

    /// Forget the identifier. Best effort: failures are only logged.
    pub fn clear_id(&self) {
        if let Err(e) = self.store.remove(DEVICE_ID_KEY) {
            error!("Error clearing device ID: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use anyhow::anyhow;

    /// Store whose every call fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage unavailable"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("storage unavailable"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow!("storage unavailable"))
        }
    }

    #[test]
    fn test_id_is_stable() {
        let identity = IdentityStore::new(MemoryStore::new());

        let first = identity.get_or_create_id().unwrap();
        let second = identity.get_or_create_id().unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_clear_generates_new_id() {
        let identity = IdentityStore::new(MemoryStore::new());

        let before = identity.get_or_create_id().unwrap();
        identity.clear_id();
        let after = identity.get_or_create_id().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_existing_value_returned_unchanged() {
        let store = MemoryStore::new();
        store.set(DEVICE_ID_KEY, "preset-id").unwrap();

        let identity = IdentityStore::new(store);
        assert_eq!(identity.get_or_create_id().unwrap(), "preset-id");
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let identity = IdentityStore::new(BrokenStore);

        let err = identity.get_or_create_id().unwrap_err();
        assert_eq!(err.to_string(), "Failed to get device ID");
    }

    #[test]
    fn test_clear_swallows_failure() {
        let identity = IdentityStore::new(BrokenStore);
        identity.clear_id();
    }
}
