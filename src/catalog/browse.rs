//! Client-side filtering, sorting and grouping of product listings.

use clap::ValueEnum;

use crate::domain::ProductSummary;

/// Label used for products without a collection
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Listing sort orders offered on collection pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Most recently created first
    #[default]
    Newest,
    /// Price: high to low
    PriceDesc,
    /// Price: low to high
    PriceAsc,
    /// Alphabetical (A-Z)
    AlphaAsc,
}

/// Keep products whose name contains `term`, case-insensitively.
pub fn filter_by_name(products: Vec<ProductSummary>, term: &str) -> Vec<ProductSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&term))
        .collect()
}

/// Stable sort; a missing price counts as zero.
pub fn sort_products(products: &mut [ProductSummary], order: SortOrder) {
    let price = |p: &ProductSummary| p.price.unwrap_or(0.0);
    match order {
        SortOrder::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::PriceDesc => {
            products.sort_by(|a, b| price(b).total_cmp(&price(a)))
        }
        SortOrder::PriceAsc => {
            products.sort_by(|a, b| price(a).total_cmp(&price(b)))
        }
        SortOrder::AlphaAsc => products.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
}

/// Group products by collection name, groups in first-seen order.
pub fn group_by_collection(products: Vec<ProductSummary>) -> Vec<(String, Vec<ProductSummary>)> {
    let mut groups: Vec<(String, Vec<ProductSummary>)> = Vec::new();
    for product in products {
        let name = product
            .collection_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        match groups.iter_mut().find(|(group, _)| *group == name) {
            Some((_, members)) => members.push(product),
            None => groups.push((name, vec![product])),
        }
    }
    groups
}
