//! Inventory data models.
//!
//! Items and storage locations arrive from the inventory service as JSON.
//! Decoding is deliberately lenient: optional fields that are missing or
//! `null` become absent, and both the flat (`technical_description`,
//! `use_cases`) and nested (`technical_details`) descriptive layouts are
//! accepted. Only a record without an integer `id` is rejected, and
//! [`decode_items`] skips such records instead of failing the batch.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord")]
pub struct Item {
    pub id: i64,
    /// Empty when the service omitted it; an empty category never matches
    /// a search term or a category facet.
    pub category: String,
    pub subcategory: Option<String>,
    /// May hold several comma-separated brands.
    pub brand: Option<String>,
    /// May hold several comma-separated models.
    pub model: Option<String>,
    pub condition: Option<String>,
    pub technical_description: Option<String>,
    pub use_cases: Vec<String>,
    pub location: ItemLocation,
    pub image_path: Option<String>,
    pub date_added: Option<NaiveDateTime>,
    pub last_modified: Option<NaiveDateTime>,
}

/// Shelf/container placement of an item.
///
/// Either side may be missing in service data; an item only counts as
/// placed when both are present (see [`Item::placement`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLocation {
    #[serde(default)]
    pub shelf: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
}

impl Item {
    /// Returns `(shelf, container)` when both are present and non-blank.
    pub fn placement(&self) -> Option<(&str, &str)> {
        let shelf = non_blank(self.location.shelf.as_deref())?;
        let container = non_blank(self.location.container.as_deref())?;
        Some((shelf, container))
    }

    /// Individual brands, split on commas and trimmed.
    pub fn brands(&self) -> Vec<&str> {
        split_values(self.brand.as_deref())
    }

    /// Individual models, split on commas and trimmed.
    pub fn models(&self) -> Vec<&str> {
        split_values(self.model.as_deref())
    }
}

/// Returns the value unless it is absent or whitespace only.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Splits a comma-encoded multi-value field into trimmed parts.
///
/// An absent field yields no parts. Empty parts (e.g. from `"Acme,"`)
/// are kept as `""`, which no facet value can equal.
pub fn split_values(value: Option<&str>) -> Vec<&str> {
    match value {
        Some(v) => v.split(',').map(str::trim).collect(),
        None => Vec::new(),
    }
}

#[derive(Deserialize)]
struct ItemRecord {
    id: i64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    technical_description: Option<String>,
    #[serde(default)]
    use_cases: Option<Vec<String>>,
    #[serde(default)]
    technical_details: Option<TechnicalDetails>,
    #[serde(default)]
    location: Option<ItemLocation>,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    date_added: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
}

#[derive(Deserialize, Default)]
struct TechnicalDetails {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    use_cases: Option<Vec<String>>,
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        let details = r.technical_details.unwrap_or_default();
        let date_added = r.date_added.as_deref().and_then(parse_timestamp);
        let mut last_modified = r.last_modified.as_deref().and_then(parse_timestamp);
        // last_modified never precedes date_added
        if let (Some(added), Some(modified)) = (date_added, last_modified) {
            if modified < added {
                last_modified = Some(added);
            }
        }

        Item {
            id: r.id,
            category: r.category.unwrap_or_default(),
            subcategory: r.subcategory,
            brand: r.brand,
            model: r.model,
            condition: r.condition,
            technical_description: r.technical_description.or(details.description),
            use_cases: r.use_cases.or(details.use_cases).unwrap_or_default(),
            location: r.location.unwrap_or_default(),
            image_path: r.image_path,
            date_added,
            last_modified,
        }
    }
}

/// Parses a service timestamp.
///
/// The service emits naive ISO-8601 (`2024-05-01T10:20:30.123456`);
/// RFC 3339 strings with an offset are accepted and converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Decodes the service's item array record by record.
///
/// Records that cannot be decoded are logged and skipped so that one bad
/// record never hides the rest of the collection.
pub fn decode_items(raw: Vec<serde_json::Value>) -> Vec<Item> {
    let total = raw.len();
    let items: Vec<Item> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(pos, value)| match serde_json::from_value::<Item>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(position = pos, error = %e, "skipping undecodable item record");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::warn!(
            skipped = total - items.len(),
            total,
            "some item records were skipped"
        );
    }
    items
}

/// A top-level storage location (shelf) and its containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShelfRecord")]
pub struct Shelf {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub containers: Vec<Container>,
}

/// A box, drawer, or organizer on a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "containerType", alias = "container_type")]
    pub container_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// Wire shape: {"level1": {...}, "level2": [...]}. The flattened
// shape produced by our own Serialize is accepted as well.
#[derive(Deserialize)]
#[serde(untagged)]
enum ShelfRecord {
    Levels {
        level1: ShelfHeader,
        #[serde(default)]
        level2: Vec<Container>,
    },
    Flat {
        id: i64,
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        containers: Vec<Container>,
    },
}

#[derive(Deserialize)]
struct ShelfHeader {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<ShelfRecord> for Shelf {
    fn from(r: ShelfRecord) -> Self {
        match r {
            ShelfRecord::Levels { level1, level2 } => Shelf {
                id: level1.id,
                name: level1.name,
                description: level1.description,
                containers: level2,
            },
            ShelfRecord::Flat {
                id,
                name,
                description,
                containers,
            } => Shelf {
                id,
                name,
                description,
                containers,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_service_item() {
        let item: Item = serde_json::from_value(json!({
            "id": 7,
            "category": "Electronics",
            "subcategory": "Microcontroller",
            "brand": "Acme, Zeta",
            "model": null,
            "condition": "Used",
            "location": {"shelf": "A", "container": "Box 1"},
            "image_path": "uploads/7.jpg",
            "date_added": "2024-05-01T10:20:30.123456",
            "last_modified": "2024-05-02T08:00:00"
        }))
        .unwrap();

        assert_eq!(item.id, 7);
        assert_eq!(item.brands(), vec!["Acme", "Zeta"]);
        assert!(item.models().is_empty());
        assert_eq!(item.placement(), Some(("A", "Box 1")));
        assert!(item.date_added.unwrap() < item.last_modified.unwrap());
    }

    #[test]
    fn nested_technical_details_fill_flat_fields() {
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "category": "Tools",
            "technical_details": {
                "description": "Cordless drill",
                "use_cases": ["drilling", "driving screws"]
            }
        }))
        .unwrap();
        assert_eq!(item.technical_description.as_deref(), Some("Cordless drill"));
        assert_eq!(item.use_cases.len(), 2);
    }

    #[test]
    fn flat_fields_win_over_nested() {
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "category": "Tools",
            "technical_description": "flat",
            "technical_details": {"description": "nested"}
        }))
        .unwrap();
        assert_eq!(item.technical_description.as_deref(), Some("flat"));
    }

    #[test]
    fn missing_fields_degrade_to_absent() {
        let item: Item = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(item.category, "");
        assert!(item.brand.is_none());
        assert!(item.placement().is_none());
        assert!(item.date_added.is_none());
    }

    #[test]
    fn half_location_is_unassigned() {
        let item: Item = serde_json::from_value(json!({
            "id": 3,
            "category": "Tools",
            "location": {"shelf": "A", "container": null}
        }))
        .unwrap();
        assert!(item.placement().is_none());
        assert_eq!(item.location.shelf.as_deref(), Some("A"));
    }

    #[test]
    fn last_modified_clamped_to_date_added() {
        let item: Item = serde_json::from_value(json!({
            "id": 3,
            "category": "Tools",
            "date_added": "2024-05-02T00:00:00",
            "last_modified": "2024-05-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(item.date_added, item.last_modified);
    }

    #[test]
    fn decode_items_skips_bad_records() {
        let items = decode_items(vec![
            json!({"id": 1, "category": "Tools"}),
            json!({"category": "no id"}),
            json!({"id": "two", "category": "Tools"}),
            json!({"id": 4, "category": "Electronics"}),
        ]);
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn serialized_item_decodes_again() {
        let item: Item = serde_json::from_value(json!({
            "id": 9,
            "category": "Tools",
            "use_cases": ["clamping"],
            "date_added": "2024-01-01T00:00:00"
        }))
        .unwrap();
        let again: Item = serde_json::from_value(serde_json::to_value(&item).unwrap()).unwrap();
        assert_eq!(item, again);
    }

    #[test]
    fn rfc3339_timestamps_accepted() {
        let ts = parse_timestamp("2024-05-01T10:20:30+02:00").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01 08:20:30");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn decodes_shelf_levels() {
        let shelf: Shelf = serde_json::from_value(json!({
            "level1": {"id": 1, "name": "Shelf A", "description": "left wall"},
            "level2": [
                {"id": 10, "name": "Box 1", "containerType": "box", "description": null},
                {"id": 11, "name": "Drawer", "containerType": "drawer"}
            ]
        }))
        .unwrap();
        assert_eq!(shelf.name, "Shelf A");
        assert_eq!(shelf.containers.len(), 2);
        assert_eq!(shelf.containers[1].container_type.as_deref(), Some("drawer"));
    }

    #[test]
    fn split_values_keeps_empty_parts() {
        assert_eq!(split_values(Some("Acme, ")), vec!["Acme", ""]);
        assert_eq!(split_values(Some("  ")), vec![""]);
        assert!(split_values(None).is_empty());
    }
}
