//! Item store accessor: holds the last successfully fetched collection and
//! storage hierarchy, and records (rather than returns) backend failures.
//!
//! Every operation is safe to repeat. A failed fetch keeps whatever was
//! held before and sets [`ItemStore::last_error`]; a successful one
//! replaces the data wholesale and clears the error only if it was about
//! that same data (items or storage). Deletes require an
//! explicit confirmation flag and resynchronise the collection on
//! success.

use crate::backend::InventoryBackend;
use crate::models::{Item, Shelf};

/// Result of [`ItemStore::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The service removed the item; the collection was refetched.
    Deleted,
    /// The caller did not confirm, so no request was sent.
    NotConfirmed,
    /// The service refused or could not be reached; see `last_error`.
    Failed,
}

/// Which data an error leaves stale. A successful fetch only clears
/// errors about its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorScope {
    Items,
    Storage,
}

pub struct ItemStore<B: InventoryBackend> {
    backend: B,
    items: Vec<Item>,
    storage: Vec<Shelf>,
    last_error: Option<(ErrorScope, String)>,
    loaded: bool,
}

impl<B: InventoryBackend> ItemStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            items: Vec::new(),
            storage: Vec::new(),
            last_error: None,
            loaded: false,
        }
    }

    /// Refetch the full item collection. Returns whether it succeeded.
    pub async fn load_all(&mut self) -> bool {
        match self.backend.fetch_items().await {
            Ok(items) => {
                tracing::info!(count = items.len(), "loaded items");
                self.items = items;
                self.loaded = true;
                self.clear_error(ErrorScope::Items);
                true
            }
            Err(e) => {
                self.record_error(ErrorScope::Items, "Error loading items", &e);
                false
            }
        }
    }

    /// Refetch the shelf/container hierarchy. Returns whether it succeeded.
    pub async fn load_storage(&mut self) -> bool {
        match self.backend.fetch_storage().await {
            Ok(shelves) => {
                tracing::info!(shelves = shelves.len(), "loaded storage hierarchy");
                self.storage = shelves;
                self.clear_error(ErrorScope::Storage);
                true
            }
            Err(e) => {
                self.record_error(ErrorScope::Storage, "Error loading storage locations", &e);
                false
            }
        }
    }

    /// Delete an item, then reload the collection.
    ///
    /// Nothing is sent unless `confirmed` is true. If the delete succeeds
    /// but the reload fails, the outcome is still [`DeleteOutcome::Deleted`]
    /// and the reload error is recorded.
    pub async fn delete(&mut self, id: i64, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            tracing::debug!(id, "delete not confirmed; skipping");
            return DeleteOutcome::NotConfirmed;
        }
        match self.backend.delete_item(id).await {
            Ok(()) => {
                tracing::info!(id, "deleted item");
                self.load_all().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                self.record_error(ErrorScope::Items, "Error deleting item", &e);
                DeleteOutcome::Failed
            }
        }
    }

    fn record_error(&mut self, scope: ErrorScope, what: &str, err: &anyhow::Error) {
        let message = format!("{}: {:#}", what, err);
        tracing::warn!("{}", message);
        self.last_error = Some((scope, message));
    }

    fn clear_error(&mut self, scope: ErrorScope) {
        if matches!(self.last_error, Some((s, _)) if s == scope) {
            self.last_error = None;
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn storage(&self) -> &[Shelf] {
        &self.storage
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_ref().map(|(_, message)| message.as_str())
    }

    /// Whether at least one `load_all` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
