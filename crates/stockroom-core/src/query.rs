//! Client-side inventory query engine.
//!
//! The visible sequence is always recomputed from the full collection by
//! [`run_query`], a pure function of the items and an immutable
//! [`QueryState`]. [`QueryEngine`] owns the current state, applies input
//! events to it, and persists the search term through a
//! [`KeyValueStore`].
//!
//! # Pipeline
//!
//! 1. **Search**: only when the term has at least [`MIN_SEARCH_LEN`]
//!    characters. An item passes if the lower-cased term is a substring of
//!    its category, subcategory, brand, model, or technical description.
//! 2. **Category**: OR across the selected categories, exact match.
//! 3. **Brand**: AND across the selected brands. The item's brand field
//!    is split on commas and trimmed; each selection must appear in it.
//!    The [`UNKNOWN`] selection is satisfied only by an absent or blank
//!    brand, so pairing it with a real brand always yields nothing.
//! 4. **Model**: same rule as brand, on the model field.
//! 5. **Sort**: stable, case-insensitive on a derived string per key.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;

use crate::facets::Facet;
use crate::kv::{KeyValueStore, SEARCH_TERM_KEY};
use crate::models::{non_blank, split_values, Item};

/// Reserved facet selection meaning "field absent or blank".
///
/// Always treated as the sentinel, even if an item literally carries the
/// brand or model `"Unknown"`.
pub const UNKNOWN: &str = "Unknown";

/// Shortest search term that narrows the collection. Shorter terms,
/// including the empty term, let every item through.
pub const MIN_SEARCH_LEN: usize = 3;

/// Facet values currently checked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetSelection {
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub models: BTreeSet<String>,
}

impl FacetSelection {
    pub fn values(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Category => &self.categories,
            Facet::Brand => &self.brands,
            Facet::Model => &self.models,
        }
    }

    fn values_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Category => &mut self.categories,
            Facet::Brand => &mut self.brands,
            Facet::Model => &mut self.models,
        }
    }

    /// Checks a value. Selecting an already selected value is a no-op.
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.values_mut(facet).insert(value.into());
    }

    /// Flips a value's membership; returns whether it is now selected.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> bool {
        let values = self.values_mut(facet);
        if values.remove(value) {
            false
        } else {
            values.insert(value.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.brands.clear();
        self.models.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.brands.is_empty() && self.models.is_empty()
    }
}

/// Column the visible sequence can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Category followed by subcategory.
    Category,
    /// Brand followed by model.
    BrandModel,
    /// Shelf followed by container.
    Location,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Category => "category",
            SortKey::BrandModel => "brand-model",
            SortKey::Location => "location",
        })
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "category" => Ok(SortKey::Category),
            "brand-model" | "brand/model" | "brand_model" | "brand" => Ok(SortKey::BrandModel),
            "location" => Ok(SortKey::Location),
            other => bail!(
                "Unknown sort key: '{}'. Use category, brand-model, or location.",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and direction. `key: None` keeps collection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Column-header click: reselecting the active key flips the
    /// direction, picking a different key starts ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn clear(&mut self) {
        *self = SortState::default();
    }
}

/// Every input the pipeline depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub search_term: String,
    pub facets: FacetSelection,
    pub sort: SortState,
}

/// Computes the visible sequence for `state` from the full collection.
///
/// Returns references into `items`; the collection itself is never
/// modified.
pub fn run_query<'a>(items: &'a [Item], state: &QueryState) -> Vec<&'a Item> {
    let needle = search_needle(&state.search_term);
    let facets = &state.facets;

    let mut visible: Vec<&Item> = items
        .iter()
        .filter(|item| match &needle {
            Some(n) => matches_search(item, n),
            None => true,
        })
        .filter(|item| facets.categories.is_empty() || facets.categories.contains(&item.category))
        .filter(|item| satisfies_all(item.brand.as_deref(), &facets.brands))
        .filter(|item| satisfies_all(item.model.as_deref(), &facets.models))
        .collect();

    if let Some(key) = state.sort.key {
        sort_visible(&mut visible, key, state.sort.direction);
    }
    visible
}

/// Lower-cased search term, or `None` when it is too short to filter.
fn search_needle(term: &str) -> Option<String> {
    if term.chars().count() >= MIN_SEARCH_LEN {
        Some(term.to_lowercase())
    } else {
        None
    }
}

/// `needle` must already be lower-cased.
fn matches_search(item: &Item, needle: &str) -> bool {
    let fields = [
        Some(item.category.as_str()),
        item.subcategory.as_deref(),
        item.brand.as_deref(),
        item.model.as_deref(),
        item.technical_description.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// AND across `selected`: each selection must be satisfied by `field`.
fn satisfies_all(field: Option<&str>, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let parts = split_values(field);
    selected.iter().all(|wanted| {
        if wanted == UNKNOWN {
            non_blank(field).is_none()
        } else {
            parts.iter().any(|part| part == wanted)
        }
    })
}

/// Lower-cased string an item is ordered by under `key`. Absent parts are
/// omitted from the concatenation.
pub fn sort_string(item: &Item, key: SortKey) -> String {
    let (first, second) = match key {
        SortKey::Category => (Some(item.category.as_str()), item.subcategory.as_deref()),
        SortKey::BrandModel => (item.brand.as_deref(), item.model.as_deref()),
        SortKey::Location => (
            item.location.shelf.as_deref(),
            item.location.container.as_deref(),
        ),
    };
    let mut s = String::new();
    s.push_str(first.unwrap_or_default());
    s.push_str(second.unwrap_or_default());
    s.to_lowercase()
}

// sort_by is stable, and reversing the comparison (not the result) keeps
// equal items in collection order for both directions.
fn sort_visible(visible: &mut Vec<&Item>, key: SortKey, direction: SortDirection) {
    let mut keyed: Vec<(String, &Item)> = visible
        .iter()
        .map(|item| (sort_string(item, key), *item))
        .collect();
    keyed.sort_by(|a, b| {
        let ord: Ordering = a.0.cmp(&b.0);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    *visible = keyed.into_iter().map(|(_, item)| item).collect();
}

/// Holds the query inputs for one browsing session.
///
/// The search term is loaded from the key-value store once at construction
/// and written back on every change; facet and sort state start empty each
/// session.
pub struct QueryEngine<K: KeyValueStore> {
    kv: K,
    state: QueryState,
}

impl<K: KeyValueStore> QueryEngine<K> {
    pub fn new(kv: K) -> Self {
        let search_term = match kv.get(SEARCH_TERM_KEY) {
            Ok(term) => term.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "could not read persisted search term");
                String::new()
            }
        };
        Self {
            kv,
            state: QueryState {
                search_term,
                ..QueryState::default()
            },
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    /// Replaces the search term and persists it. A failed write is logged;
    /// the in-memory term is updated regardless.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
        if let Err(e) = self.kv.set(SEARCH_TERM_KEY, &self.state.search_term) {
            tracing::warn!(error = %format!("{:#}", e), "could not persist search term");
        }
    }

    pub fn toggle_facet(&mut self, facet: Facet, value: &str) -> bool {
        self.state.facets.toggle(facet, value)
    }

    pub fn set_facets(&mut self, facets: FacetSelection) {
        self.state.facets = facets;
    }

    pub fn clear_facets(&mut self) {
        self.state.facets.clear();
    }

    pub fn select_sort(&mut self, key: SortKey) {
        self.state.sort.select(key);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.state.sort = sort;
    }

    /// Visible sequence for the current inputs, recomputed from `items`.
    pub fn visible<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        run_query(items, &self.state)
    }
}
