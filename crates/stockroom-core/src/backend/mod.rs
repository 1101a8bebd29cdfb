//! Boundary to the remote inventory service.
//!
//! The [`InventoryBackend`] trait covers the operations the item store
//! accessor needs: fetching the full item collection, deleting one item,
//! and fetching the shelf/container hierarchy. The CLI implements it over
//! HTTP; [`memory::InMemoryBackend`] serves tests and embedders.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Item, Shelf};

/// Abstract inventory service.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`fetch_items`](InventoryBackend::fetch_items) | Complete item collection |
/// | [`delete_item`](InventoryBackend::delete_item) | Remove one item by id |
/// | [`fetch_storage`](InventoryBackend::fetch_storage) | Shelves with their containers |
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// Fetch every item the service holds, in service order.
    async fn fetch_items(&self) -> Result<Vec<Item>>;

    /// Delete the item with `id`. An unknown id is an error.
    async fn delete_item(&self, id: i64) -> Result<()>;

    /// Fetch the storage hierarchy.
    async fn fetch_storage(&self) -> Result<Vec<Shelf>>;
}
