//! `stock storage`: the shelf → container hierarchy with item counts.

use anyhow::{bail, Result};
use serde::Serialize;
use stockroom_core::models::{Item, Shelf};

use crate::config::Config;
use crate::items::open_store;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ShelfSummary<'a> {
    shelf: &'a str,
    items: Option<usize>,
    containers: Vec<ContainerSummary<'a>>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ContainerSummary<'a> {
    container: &'a str,
    container_type: Option<&'a str>,
    items: Option<usize>,
}

/// Counts items per shelf and container. Items are matched by name,
/// since that is all an item's location records. With no items (they
/// failed to load) every count is `None`.
fn summarize<'a>(shelves: &'a [Shelf], items: Option<&[Item]>) -> Vec<ShelfSummary<'a>> {
    shelves
        .iter()
        .map(|shelf| {
            let on_shelf: Option<Vec<&Item>> = items.map(|items| {
                items
                    .iter()
                    .filter(|i| i.location.shelf.as_deref() == Some(shelf.name.as_str()))
                    .collect()
            });
            let containers = shelf
                .containers
                .iter()
                .map(|c| ContainerSummary {
                    container: &c.name,
                    container_type: c.container_type.as_deref(),
                    items: on_shelf.as_ref().map(|on_shelf| {
                        on_shelf
                            .iter()
                            .filter(|i| i.location.container.as_deref() == Some(c.name.as_str()))
                            .count()
                    }),
                })
                .collect();
            ShelfSummary {
                shelf: &shelf.name,
                items: on_shelf.map(|on_shelf| on_shelf.len()),
                containers,
            }
        })
        .collect()
}

pub async fn run_storage(config: &Config, json: bool) -> Result<()> {
    let mut store = open_store(config)?;
    if !store.load_storage().await {
        bail!(
            "{}",
            store
                .last_error()
                .unwrap_or("Error loading storage locations")
        );
    }
    // Without items the hierarchy is printed without counts.
    let counted = store.load_all().await;
    if !counted {
        eprintln!(
            "Warning: {}",
            store.last_error().unwrap_or("Error loading items")
        );
    }

    let items = counted.then(|| store.items());
    let summary = summarize(store.storage(), items);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    if summary.is_empty() {
        println!("No storage locations.");
        return Ok(());
    }

    for shelf in &summary {
        match shelf.items {
            Some(n) => println!("{} ({} items)", shelf.shelf, n),
            None => println!("{}", shelf.shelf),
        }
        if shelf.containers.is_empty() {
            println!("  (no containers)");
        }
        for c in &shelf.containers {
            let kind = c.container_type.map(|t| format!(" [{}]", t)).unwrap_or_default();
            match c.items {
                Some(n) => println!("  {}{}: {} items", c.container, kind, n),
                None => println!("  {}{}", c.container, kind),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_core::models::decode_items;

    #[test]
    fn counts_items_by_shelf_and_container_name() {
        let shelves: Vec<Shelf> = serde_json::from_value(json!([
            {"level1": {"id": 1, "name": "Shelf A"}, "level2": [
                {"id": 1, "name": "Drawer 1", "containerType": "drawer"},
                {"id": 2, "name": "Drawer 2"}
            ]},
            {"level1": {"id": 2, "name": "Shelf B"}, "level2": []}
        ]))
        .unwrap();
        let items = decode_items(vec![
            json!({"id": 1, "location": {"shelf": "Shelf A", "container": "Drawer 1"}}),
            json!({"id": 2, "location": {"shelf": "Shelf A", "container": "Drawer 1"}}),
            json!({"id": 3, "location": {"shelf": "Shelf A"}}),
            json!({"id": 4, "location": {"shelf": "Shelf C", "container": "Drawer 1"}}),
        ]);

        let summary = summarize(&shelves, Some(&items));
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].items, Some(3));
        assert_eq!(summary[0].containers[0].items, Some(2));
        assert_eq!(summary[0].containers[0].container_type, Some("drawer"));
        assert_eq!(summary[0].containers[1].items, Some(0));
        assert_eq!(summary[1].items, Some(0));
    }

    #[test]
    fn uncounted_when_items_are_missing() {
        let shelves: Vec<Shelf> = serde_json::from_value(json!([
            {"level1": {"id": 1, "name": "Shelf A"}, "level2": [
                {"id": 1, "name": "Drawer 1", "containerType": "drawer"}
            ]}
        ]))
        .unwrap();

        let summary = summarize(&shelves, None);
        assert_eq!(summary[0].items, None);
        assert_eq!(summary[0].containers[0].items, None);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value[0]["items"], serde_json::Value::Null);
        assert_eq!(value[0]["containers"][0]["items"], serde_json::Value::Null);
    }
}
