//! In-memory [`InventoryBackend`] for tests and offline use.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Failures can be injected to
//! exercise the accessor's error paths, and request counters record how
//! often each operation was called.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{Item, Shelf};

use super::InventoryBackend;

/// In-memory inventory service.
#[derive(Default)]
pub struct InMemoryBackend {
    items: RwLock<Vec<Item>>,
    shelves: RwLock<Vec<Shelf>>,
    offline: AtomicBool,
    reject_deletes: AtomicBool,
    fetches: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
            ..Self::default()
        }
    }

    pub fn with_storage(self, shelves: Vec<Shelf>) -> Self {
        Self {
            shelves: RwLock::new(shelves),
            ..self
        }
    }

    /// While offline, every operation fails as if the service were
    /// unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes deletes fail with a service error while fetches still work.
    pub fn set_reject_deletes(&self, reject: bool) {
        self.reject_deletes.store(reject, Ordering::SeqCst);
    }

    /// Replaces the held items, e.g. to simulate another client's edit.
    pub fn replace_items(&self, items: Vec<Item>) -> Result<()> {
        *self.items.write().map_err(|_| anyhow!("backend lock poisoned"))? = items;
        Ok(())
    }

    /// Number of `fetch_items` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `delete_item` calls so far.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("inventory service unreachable");
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryBackend for InMemoryBackend {
    async fn fetch_items(&self) -> Result<Vec<Item>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let items = self.items.read().map_err(|_| anyhow!("backend lock poisoned"))?;
        Ok(items.clone())
    }

    async fn delete_item(&self, id: i64) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        if self.reject_deletes.load(Ordering::SeqCst) {
            bail!("delete rejected by service");
        }
        let mut items = self.items.write().map_err(|_| anyhow!("backend lock poisoned"))?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            bail!("Item not found: {}", id);
        }
        Ok(())
    }

    async fn fetch_storage(&self) -> Result<Vec<Shelf>> {
        self.ensure_online()?;
        let shelves = self.shelves.read().map_err(|_| anyhow!("backend lock poisoned"))?;
        Ok(shelves.clone())
    }
}
