//! # Stockroom
//!
//! A command-line client for a workshop inventory service.
//!
//! Stockroom fetches the item collection from the service and does all
//! searching, faceting, and sorting locally with
//! [`stockroom_core`]. The last search term is kept in a small state file
//! so it survives between runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  HTTP  ┌─────────────┐   ┌──────────────────┐
//! │  Inventory   │◀──────▶│ HttpBackend │──▶│  stockroom-core  │
//! │   service    │        │  (client)   │   │ store/query/facet│
//! └──────────────┘        └─────────────┘   └────────┬─────────┘
//!                                                    │
//!                          ┌──────────────┐   ┌──────▼─────┐
//!                          │  state.json  │◀──│    CLI     │
//!                          │ (search term)│   │  (stock)   │
//!                          └──────────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! stock items                          # everything, in service order
//! stock items --search drill           # search (persisted for next time)
//! stock items --brand Unknown --sort location --desc
//! stock facets                         # available filter values
//! stock delete 42                      # asks before deleting
//! stock backup export
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | HTTP inventory backend |
//! | [`state`] | File-backed key-value store |
//! | [`items`] | Listing, facets, detail, delete, search term |
//! | [`storage`] | Shelf and container hierarchy |
//! | [`backup`] | Backup export and restore |
//! | [`ask`] | Questions to the service |
//! | [`logging`] | Diagnostic log setup |

pub mod ask;
pub mod backup;
pub mod client;
pub mod config;
pub mod confirm;
pub mod items;
pub mod logging;
pub mod state;
pub mod storage;
