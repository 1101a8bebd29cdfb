//! Item commands: listing with search/facets/sort, the facet index,
//! single-item detail, deletion, and the persisted search term.
//!
//! Every command fetches a fresh collection through an [`ItemStore`]; the
//! search term lives in the state file so it carries over between runs
//! the way it carries over between page loads in the web client.

use anyhow::{bail, Result};
use serde::Serialize;
use stockroom_core::accessor::{DeleteOutcome, ItemStore};
use stockroom_core::facets::{Facet, FacetIndex};
use stockroom_core::kv::{KeyValueStore, SEARCH_TERM_KEY};
use stockroom_core::models::{non_blank, Item};
use stockroom_core::query::{
    FacetSelection, QueryEngine, QueryState, SortDirection, SortKey, SortState, MIN_SEARCH_LEN,
};

use crate::client::HttpBackend;
use crate::config::Config;
use crate::confirm::{confirm, Approval};
use crate::state::JsonFileKv;

/// Filter and sort options for `stock items`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// New search term; `None` keeps the persisted one.
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub json: bool,
}

impl ListOptions {
    fn facets(&self) -> FacetSelection {
        let mut selection = FacetSelection::default();
        let groups = [
            (Facet::Category, &self.categories),
            (Facet::Brand, &self.brands),
            (Facet::Model, &self.models),
        ];
        for (facet, values) in groups {
            for value in values {
                selection.select(facet, value.as_str());
            }
        }
        selection
    }

    fn sort_state(&self) -> SortState {
        match self.sort {
            Some(key) if self.descending => SortState::by(key, SortDirection::Descending),
            Some(key) => SortState::by(key, SortDirection::Ascending),
            None => SortState::default(),
        }
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    query: &'a QueryState,
    total: usize,
    items: Vec<&'a Item>,
}

pub fn open_store(config: &Config) -> Result<ItemStore<HttpBackend>> {
    Ok(ItemStore::new(HttpBackend::new(&config.service)?))
}

pub fn open_engine(config: &Config) -> QueryEngine<JsonFileKv> {
    QueryEngine::new(JsonFileKv::new(&config.state.path))
}

/// Loads the collection or turns the recorded accessor error into a
/// command failure.
async fn load_items(store: &mut ItemStore<HttpBackend>) -> Result<()> {
    if !store.load_all().await {
        bail!(
            "{}",
            store.last_error().unwrap_or("Error loading items")
        );
    }
    Ok(())
}

pub async fn run_items(config: &Config, opts: ListOptions) -> Result<()> {
    let mut store = open_store(config)?;
    load_items(&mut store).await?;

    let mut engine = open_engine(config);
    if let Some(term) = &opts.search {
        engine.set_search_term(term.as_str());
    }
    engine.set_facets(opts.facets());
    engine.set_sort(opts.sort_state());

    let visible = engine.visible(store.items());
    let total = store.items().len();

    if opts.json {
        let listing = Listing {
            query: engine.state(),
            total,
            items: visible,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let term = engine.search_term();
    if !term.is_empty() && term.chars().count() < MIN_SEARCH_LEN {
        eprintln!(
            "Search term '{}' is shorter than {} characters and is ignored.",
            term, MIN_SEARCH_LEN
        );
    }

    if visible.is_empty() {
        println!("No items.");
    } else {
        print_table(&visible);
    }
    if visible.len() != total {
        println!();
        println!("Showing {} of {} items", visible.len(), total);
    }
    Ok(())
}

fn print_table(items: &[&Item]) {
    println!(
        "{:<6} {:<20} {:<32} {}",
        "ID", "CATEGORY", "BRAND/MODEL", "LOCATION"
    );
    for item in items {
        println!(
            "{:<6} {:<20} {:<32} {}",
            item.id,
            item.category,
            brand_model(item),
            location(item)
        );
    }
}

/// `"brand - model"`, whichever halves are present, or `N/A`.
pub fn brand_model(item: &Item) -> String {
    let parts: Vec<&str> = [item.brand.as_deref(), item.model.as_deref()]
        .into_iter()
        .filter_map(non_blank)
        .collect();
    if parts.is_empty() {
        "N/A".to_string()
    } else {
        parts.join(" - ")
    }
}

/// `"shelf - container"`, or `No location` unless both are present.
pub fn location(item: &Item) -> String {
    match item.placement() {
        Some((shelf, container)) => format!("{} - {}", shelf, container),
        None => "No location".to_string(),
    }
}

pub async fn run_facets(config: &Config, json: bool) -> Result<()> {
    let mut store = open_store(config)?;
    load_items(&mut store).await?;
    let index = FacetIndex::build(store.items());

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }
    if index.is_empty() {
        println!("No facet values.");
        return Ok(());
    }
    for (n, (facet, values)) in index.populated().enumerate() {
        if n > 0 {
            println!();
        }
        println!("{} ({}):", facet.heading(), values.len());
        for value in values {
            println!("  {}", value);
        }
    }
    Ok(())
}

pub async fn run_show(config: &Config, id: i64, json: bool) -> Result<()> {
    let mut store = open_store(config)?;
    load_items(&mut store).await?;
    let Some(item) = store.item(id) else {
        bail!("item not found: {}", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
        return Ok(());
    }

    println!("--- Item {} ---", item.id);
    println!("category:     {}", item.category);
    if let Some(sub) = non_blank(item.subcategory.as_deref()) {
        println!("subcategory:  {}", sub);
    }
    println!("brand/model:  {}", brand_model(item));
    if let Some(condition) = non_blank(item.condition.as_deref()) {
        println!("condition:    {}", condition);
    }
    println!("location:     {}", location(item));
    if let Some(image) = non_blank(item.image_path.as_deref()) {
        println!("image:        {}", image);
    }
    if let Some(added) = item.date_added {
        println!("added:        {}", added.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(modified) = item.last_modified {
        println!("modified:     {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(description) = non_blank(item.technical_description.as_deref()) {
        println!();
        println!("--- Description ---");
        println!("{}", description);
    }
    if !item.use_cases.is_empty() {
        println!();
        println!("--- Use cases ({}) ---", item.use_cases.len());
        for use_case in &item.use_cases {
            println!("- {}", use_case);
        }
    }
    Ok(())
}

pub async fn run_delete(config: &Config, id: i64, yes: bool) -> Result<()> {
    let mut store = open_store(config)?;
    load_items(&mut store).await?;

    let question = match store.item(id) {
        Some(item) => format!(
            "Delete item {} ({}, {})?",
            id,
            item.category,
            brand_model(item)
        ),
        None => format!("Delete item {}?", id),
    };
    let approval = confirm(&question, yes)?;
    if approval == Approval::Unavailable {
        bail!(
            "Refusing to delete item {} without confirmation. Re-run with --yes.",
            id
        );
    }

    match store.delete(id, approval.granted()).await {
        DeleteOutcome::Deleted => {
            println!("Deleted item {}.", id);
            if store.last_error().is_none() {
                println!("{} items remain.", store.items().len());
            }
        }
        DeleteOutcome::NotConfirmed => println!("Cancelled."),
        DeleteOutcome::Failed => {
            bail!("{}", store.last_error().unwrap_or("Error deleting item"));
        }
    }
    Ok(())
}

pub fn run_term_show(config: &Config) -> Result<()> {
    let engine = open_engine(config);
    let term = engine.search_term();
    if term.is_empty() {
        println!("No search term set.");
    } else if term.chars().count() < MIN_SEARCH_LEN {
        println!(
            "{} (inactive: shorter than {} characters)",
            term, MIN_SEARCH_LEN
        );
    } else {
        println!("{}", term);
    }
    Ok(())
}

pub fn run_term_set(config: &Config, term: &str) -> Result<()> {
    let kv = JsonFileKv::new(&config.state.path);
    kv.set(SEARCH_TERM_KEY, term)?;
    println!("Search term set to '{}'.", term);
    Ok(())
}

pub fn run_term_clear(config: &Config) -> Result<()> {
    let kv = JsonFileKv::new(&config.state.path);
    kv.remove(SEARCH_TERM_KEY)?;
    println!("Search term cleared.");
    Ok(())
}
