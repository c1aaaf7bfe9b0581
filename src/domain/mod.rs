//! Domain types shared across modules.
//!
//! This module contains data structures that are used by multiple
//! parts of the application (API gateway, cart, search, catalog browsing).
//! Keeping them here avoids circular dependencies between modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted wishlist/cart item.
///
/// Serialized with the camelCase field names the storefront has always
/// written to local storage (`productId`, `addedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: String,
    /// Milliseconds since the Unix epoch
    pub added_at: i64,
}

impl CartEntry {
    pub fn new(product_id: impl Into<String>, added_at: i64) -> Self {
        Self {
            product_id: product_id.into(),
            added_at,
        }
    }
}

/// Display-ready product record fetched from the catalog.
///
/// Never constructed from user input and never persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: Option<f64>,
    pub affiliate_link: String,
    pub collection_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A state/region of origin used to group handicrafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// A curated product collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// A festive campaign with its own landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Festival {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub banner_image: Option<String>,
}

/// A festival together with the products featured for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FestivalDetail {
    pub name: String,
    pub banner_image: Option<String>,
    pub products: Vec<ProductSummary>,
}

/// Discriminator carried by rows of the `search_all` procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Product,
    #[serde(rename = "state")]
    Region,
    Collection,
}

/// One row returned by the remote full-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub kind: ResultKind,
    pub image: String,
    pub link: String,
}

/// Server-side product selection (select-all-with-filter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Collection display name (matched case-insensitively)
    pub collection: Option<String>,
    /// Region display name (matched case-insensitively)
    pub region: Option<String>,
    pub gi_tagged: bool,
    pub limit: Option<usize>,
    pub newest_first: bool,
}
