//! Facet index: the distinct category, brand, and model values present in
//! a collection, used to populate filter choices.
//!
//! Values are taken verbatim. A brand field of `"Acme, Zeta"` contributes
//! the single value `"Acme, Zeta"`; comma splitting only happens when a
//! selection is matched against items (see [`crate::query`]).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;

use crate::models::{non_blank, Item};

/// A filterable item dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Category,
    Brand,
    Model,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Category, Facet::Brand, Facet::Model];

    /// Plural heading used when listing a facet's values.
    pub fn heading(&self) -> &'static str {
        match self {
            Facet::Category => "Categories",
            Facet::Brand => "Brands",
            Facet::Model => "Models",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Facet::Category => "category",
            Facet::Brand => "brand",
            Facet::Model => "model",
        })
    }
}

impl FromStr for Facet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "category" | "categories" => Ok(Facet::Category),
            "brand" | "brands" => Ok(Facet::Brand),
            "model" | "models" => Ok(Facet::Model),
            other => bail!("Unknown facet: '{}'. Use category, brand, or model.", other),
        }
    }
}

/// Distinct facet values of a collection, in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetIndex {
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub models: BTreeSet<String>,
}

impl FacetIndex {
    /// Scans every item once. Absent or blank values are not indexed.
    pub fn build(items: &[Item]) -> Self {
        let mut index = FacetIndex::default();
        for item in items {
            if let Some(category) = non_blank(Some(item.category.as_str())) {
                index.categories.insert(category.to_string());
            }
            if let Some(brand) = non_blank(item.brand.as_deref()) {
                index.brands.insert(brand.to_string());
            }
            if let Some(model) = non_blank(item.model.as_deref()) {
                index.models.insert(model.to_string());
            }
        }
        index
    }

    pub fn values(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Category => &self.categories,
            Facet::Brand => &self.brands,
            Facet::Model => &self.models,
        }
    }

    /// Facets that have at least one value. Empty facets are left out of
    /// filter listings entirely.
    pub fn populated(&self) -> impl Iterator<Item = (Facet, &BTreeSet<String>)> + '_ {
        Facet::ALL
            .into_iter()
            .map(move |facet| (facet, self.values(facet)))
            .filter(|(_, values)| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.populated().next().is_none()
    }
}
