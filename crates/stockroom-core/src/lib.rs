//! # Stockroom Core
//!
//! Shared, I/O-free logic for Stockroom: item models, the facet index,
//! the client-side query engine, the inventory backend trait, and the
//! item store accessor that sits between them.
//!
//! This crate contains no HTTP client, filesystem access, or async
//! runtime. The `stock` CLI supplies a reqwest-backed
//! [`InventoryBackend`](backend::InventoryBackend) and a file-backed
//! [`KeyValueStore`](kv::KeyValueStore); tests use the in-memory ones
//! shipped here.
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Inventory   │──▶│  ItemStore  │──▶│  FacetIndex  │
//! │   backend    │   │ (accessor)  │   └──────────────┘
//! └──────────────┘   └──────┬──────┘
//!                           ▼
//!                    ┌─────────────┐   ┌──────────────┐
//!                    │ QueryEngine │◀──│ KeyValueStore│
//!                    │ search/facet│   │ (search term)│
//!                    │   /sort     │   └──────────────┘
//!                    └─────────────┘
//! ```

pub mod accessor;
pub mod backend;
pub mod facets;
pub mod kv;
pub mod models;
pub mod query;
