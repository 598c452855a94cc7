use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::CategorySpec;

/// Price as it leaves an extractor.
///
/// Browser extraction keeps the site's display string untouched; the
/// storefront API yields a numeric amount in major currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

/// Stock state, normalized at record construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    ComingSoon,
    OutOfStock,
    Unknown,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Unknown
    }
}

impl Availability {
    /// Map a raw storefront-API availability string onto the canonical set.
    #[must_use]
    pub fn from_api(raw: Option<&str>) -> Self {
        match raw {
            Some("in_stock") => Availability::Available,
            Some("coming_soon") => Availability::ComingSoon,
            Some("out_of_stock" | "sold_out") => Availability::OutOfStock,
            _ => Availability::Unknown,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::ComingSoon => write!(f, "coming_soon"),
            Availability::OutOfStock => write!(f, "out_of_stock"),
            Availability::Unknown => write!(f, "unknown"),
        }
    }
}

/// One extracted product. Immutable once built; `url` is the sole
/// deduplication key at the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub color_reference: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    pub category: String,
    pub gender: String,
}

/// Snapshot written after every processed category so an interrupted run
/// can pick up where it left off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressCheckpoint {
    /// Index of the next category to process.
    pub current_index: usize,
    pub categories: Vec<CategorySpec>,
    pub products: Vec<ProductRecord>,
    pub timestamp: String,
}

impl ProgressCheckpoint {
    #[must_use]
    pub fn new(
        current_index: usize,
        categories: Vec<CategorySpec>,
        products: Vec<ProductRecord>,
    ) -> Self {
        Self {
            current_index,
            categories,
            products,
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
