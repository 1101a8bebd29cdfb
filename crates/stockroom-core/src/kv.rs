//! Durable key-value storage for UI state that survives restarts.
//!
//! The only entry the query engine keeps is the search term, stored under
//! [`SEARCH_TERM_KEY`]. The CLI backs this with a JSON file; tests and
//! embedders can use [`MemoryKv`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};

/// Key holding the persisted search term.
pub const SEARCH_TERM_KEY: &str = "inventory-search-query";

/// String-to-string storage scoped to one user profile.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Process-local store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| anyhow!("kv lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("kv lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("kv lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get(SEARCH_TERM_KEY).unwrap(), None);
        kv.set(SEARCH_TERM_KEY, "drill").unwrap();
        assert_eq!(kv.get(SEARCH_TERM_KEY).unwrap().as_deref(), Some("drill"));
        kv.remove(SEARCH_TERM_KEY).unwrap();
        assert_eq!(kv.get(SEARCH_TERM_KEY).unwrap(), None);
    }

    #[test]
    fn shared_through_arc() {
        let kv = Arc::new(MemoryKv::new());
        let other = Arc::clone(&kv);
        other.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
    }
}
