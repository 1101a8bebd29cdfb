//! File-backed key-value store for state that outlives one invocation.
//!
//! The file is a flat JSON object of string values. A missing file reads
//! as empty; writes go to a sibling temp file that is renamed over the
//! original, creating parent directories as needed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stockroom_core::kv::KeyValueStore;

pub struct JsonFileKv {
    path: PathBuf,
}

impl JsonFileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read state file: {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create state directory: {}", parent.display())
                })?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(map)?;
        std::fs::write(&tmp, body)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::kv::SEARCH_TERM_KEY;
    use stockroom_core::query::QueryEngine;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let kv = JsonFileKv::new(dir.path().join("nope.json"));
        assert_eq!(kv.get(SEARCH_TERM_KEY).unwrap(), None);
        kv.remove(SEARCH_TERM_KEY).unwrap();
        assert!(!kv.path().exists());
    }

    #[test]
    fn creates_parent_dirs_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let kv = JsonFileKv::new(dir.path().join("profile/default/state.json"));
        kv.set("theme", "dark").unwrap();
        kv.set(SEARCH_TERM_KEY, "multimeter").unwrap();
        kv.remove(SEARCH_TERM_KEY).unwrap();
        assert_eq!(kv.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(kv.get(SEARCH_TERM_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileKv::new(&path).get("k").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse state file"));
    }

    #[test]
    fn search_term_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut engine = QueryEngine::new(JsonFileKv::new(&path));
        engine.set_search_term("heat gun");
        drop(engine);

        let engine = QueryEngine::new(JsonFileKv::new(&path));
        assert_eq!(engine.search_term(), "heat gun");
    }
}
