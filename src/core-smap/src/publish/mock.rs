//! In-memory destination for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::DestinationError;
use crate::publish::Destination;

/// Stores artifacts in a map. Clones share the same storage.
///
/// Keys listed as failing are refused and leave any previous value untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    objects: Arc<Mutex<BTreeMap<String, String>>>,
    failing: BTreeSet<String>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// A destination that refuses every write to the given keys.
    pub fn failing(keys: &[&str]) -> Self {
        Self {
            objects: Arc::default(),
            failing: keys.iter().map(|key| key.to_string()).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Seeds a value, as if an earlier run had written it.
    pub fn insert(&self, key: &str, body: &str) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.to_string(), body.to_string());
        }
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn put(&self, key: &str, body: &str) -> Result<(), DestinationError> {
        if self.failing.contains(key) {
            return Err(DestinationError::Refused(format!("{} is configured to fail", key)));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| DestinationError::Refused("storage lock poisoned".to_string()))?;
        objects.insert(key.to_string(), body.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
