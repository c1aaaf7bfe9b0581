//! In-memory search over preloaded products, states and collections.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::CatalogSource;
use crate::catalog::Route;
use crate::domain::{Collection, ProductFilter, ProductSummary, Region};

pub const MAX_PRODUCTS: usize = 12;
pub const MAX_REGIONS: usize = 6;
pub const MAX_COLLECTIONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Products,
    States,
    Collections,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Products => "Products",
            SectionKind::States => "States",
            SectionKind::Collections => "Collections",
        }
    }
}

/// One entry of a result section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItem {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Affiliate link for products, storefront route for states and collections
    pub link: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSection {
    pub kind: SectionKind,
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "sections", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Query was empty; ask for input
    Prompt,
    /// Query matched nothing
    NoResults,
    /// Non-empty sections in display order
    Sections(Vec<ResultSection>),
}

impl From<&ProductSummary> for ResultItem {
    fn from(product: &ProductSummary) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            link: product.affiliate_link.clone(),
            price: product.price,
        }
    }
}

impl From<&Region> for ResultItem {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
            image: region.image.clone(),
            link: Route::state(&region.name).path(),
            price: None,
        }
    }
}

impl From<&Collection> for ResultItem {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            image: collection.image.clone(),
            link: Route::collection(&collection.name).path(),
            price: None,
        }
    }
}

/// Case-insensitive substring match on names, capped at `limit` items.
fn matching<'a, T: 'a>(
    candidates: &'a [T],
    query: &str,
    limit: usize,
    name: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    candidates
        .iter()
        .filter(|&c| name(c).to_lowercase().contains(query))
        .take(limit)
        .collect()
}

/// Put non-empty sections in display order.
pub(super) fn ordered_sections(
    order: [SectionKind; 3],
    mut sections: Vec<ResultSection>,
) -> SearchOutcome {
    sections.retain(|section| !section.items.is_empty());
    if sections.is_empty() {
        return SearchOutcome::NoResults;
    }
    sections.sort_by_key(|section| order.iter().position(|kind| *kind == section.kind));
    SearchOutcome::Sections(sections)
}

pub(super) const DEFAULT_ORDER: [SectionKind; 3] =
    [SectionKind::Products, SectionKind::States, SectionKind::Collections];

/// Candidate lists the search overlay ranks against.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    pub products: Vec<ProductSummary>,
    pub regions: Vec<Region>,
    pub collections: Vec<Collection>,
}

impl SearchIndex {
    /// Load all three candidate lists concurrently.
    ///
    /// A list that fails to load stays empty; the others are still usable.
    pub async fn preload(source: Arc<dyn CatalogSource>) -> Self {
        let filter = ProductFilter::default();
        let (products, regions, collections) = tokio::join!(
            source.products(&filter),
            source.regions(),
            source.collections()
        );

        let products = products.unwrap_or_else(|e| {
            warn!("Failed to preload products for search: {}", e);
            Vec::new()
        });
        let regions = regions.unwrap_or_else(|e| {
            warn!("Failed to preload states for search: {}", e);
            Vec::new()
        });
        let collections = collections.unwrap_or_else(|e| {
            warn!("Failed to preload collections for search: {}", e);
            Vec::new()
        });

        debug!(
            "Search index: {} products, {} states, {} collections",
            products.len(),
            regions.len(),
            collections.len()
        );
        Self {
            products,
            regions,
            collections,
        }
    }

    /// Rank the candidates against `query`.
    ///
    /// A query naming a state exactly puts States first; failing that, one
    /// naming a collection exactly puts Collections first.
    pub fn rank(&self, query: &str) -> SearchOutcome {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return SearchOutcome::Prompt;
        }

        let products = matching(&self.products, &query, MAX_PRODUCTS, |p| p.name.as_str());
        let regions = matching(&self.regions, &query, MAX_REGIONS, |r| r.name.as_str());
        let collections =
            matching(&self.collections, &query, MAX_COLLECTIONS, |c| c.name.as_str());

        let order = if self.regions.iter().any(|r| r.name.to_lowercase() == query) {
            [SectionKind::States, SectionKind::Products, SectionKind::Collections]
        } else if self.collections.iter().any(|c| c.name.to_lowercase() == query) {
            [SectionKind::Collections, SectionKind::Products, SectionKind::States]
        } else {
            DEFAULT_ORDER
        };

        let sections = vec![
            ResultSection {
                kind: SectionKind::Products,
                items: products.into_iter().map(ResultItem::from).collect(),
            },
            ResultSection {
                kind: SectionKind::States,
                items: regions.into_iter().map(ResultItem::from).collect(),
            },
            ResultSection {
                kind: SectionKind::Collections,
                items: collections.into_iter().map(ResultItem::from).collect(),
            },
        ];
        ordered_sections(order, sections)
    }
}
