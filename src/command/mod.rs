mod cart;
mod configure;
mod festivals;
mod open;
mod products;
mod reset;
mod search;
mod status;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::{CatalogError, CatalogSource, RestCatalog};
use crate::cart::{CartService, CartStore, FileStorage, CART_STORAGE_KEY};
use crate::config::ConfigStore;
use crate::domain::ProductSummary;
use crate::popularity::PopularityTracker;

pub use cart::{run_cart_add, run_cart_list, run_cart_remove};
pub use configure::run_configure;
pub use festivals::run_festivals;
pub use open::run_open;
pub use products::{run_products, ProductsArgs};
pub use reset::run_reset;
pub use search::run_search;
pub use status::run_status;

/// Build the catalog client from the active configuration.
fn connect(data_dir: &Path) -> Result<Arc<dyn CatalogSource>> {
    let config = ConfigStore::new(data_dir).require()?;
    let catalog = RestCatalog::new(&config).context("Failed to create catalog client")?;
    Ok(Arc::new(catalog))
}

/// Open the persisted cart on top of `source`.
fn open_cart(data_dir: &Path, source: Arc<dyn CatalogSource>) -> CartService {
    let store = CartStore::open(Box::new(FileStorage::new(data_dir, CART_STORAGE_KEY)));
    let tracker = PopularityTracker::new(Arc::clone(&source));
    CartService::new(store, source, tracker)
}

/// Wrap a catalog failure, pointing at the configuration when the backend
/// rejected our settings.
fn catalog_failure(action: &str, err: CatalogError) -> anyhow::Error {
    let hint = match err.status() {
        Some(status) if status.is_configuration_error() => {
            "\nCheck the backend settings with 'antiqkart status'."
        }
        _ => "",
    };
    anyhow::anyhow!("Failed to {}: {}{}", action, err, hint)
}

/// Print `question` and read one trimmed line.
fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("₹{:.0}", price),
        None => "price on request".to_string(),
    }
}

fn print_product(index: usize, product: &ProductSummary) {
    println!(
        "  {:>2}. {}  ({})  [{}]",
        index + 1,
        product.name,
        format_price(product.price),
        product.id
    );
    println!("      {}", product.affiliate_link);
}
