use std::path::Path;

use anyhow::Result;

use super::{catalog_failure, connect, print_json, print_product};
use crate::catalog::{
    filter_by_name, group_by_collection, name_from_slug, sort_products, SortOrder,
};
use crate::domain::ProductFilter;

/// Options of the `products` listing
#[derive(Debug, Clone, Default)]
pub struct ProductsArgs {
    pub collection: Option<String>,
    pub region: Option<String>,
    pub gi_tagged: bool,
    pub sort: SortOrder,
    pub filter: Option<String>,
    pub limit: Option<usize>,
    pub grouped: bool,
}

impl ProductsArgs {
    /// Server-side part of the listing. Names and slugs are both accepted.
    fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            collection: self.collection.as_deref().map(name_from_slug),
            region: self.region.as_deref().map(name_from_slug),
            gi_tagged: self.gi_tagged,
            limit: self.limit,
            newest_first: self.sort == SortOrder::Newest,
        }
    }
}

pub async fn run_products(data_dir: &Path, args: ProductsArgs, json: bool) -> Result<()> {
    let source = connect(data_dir)?;
    let products = source
        .products(&args.to_filter())
        .await
        .map_err(|e| catalog_failure("load products", e))?;

    let mut products = match &args.filter {
        Some(term) => filter_by_name(products, term),
        None => products,
    };
    sort_products(&mut products, args.sort);

    if json {
        return if args.grouped {
            print_json(&group_by_collection(products))
        } else {
            print_json(&products)
        };
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    if args.grouped {
        for (collection, members) in group_by_collection(products) {
            println!("\n{} ({})", collection, members.len());
            for (i, product) in members.iter().enumerate() {
                print_product(i, product);
            }
        }
    } else {
        println!("{} product(s):", products.len());
        for (i, product) in products.iter().enumerate() {
            print_product(i, product);
        }
    }
    Ok(())
}
