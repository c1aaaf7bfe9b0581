use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use super::{connect, open_cart, print_json, print_product};
use crate::cart::{CartService, CartStore, FileStorage, CART_STORAGE_KEY};

/// How long `cart add` waits for the popularity ping before exiting
const PING_GRACE: Duration = Duration::from_secs(3);

pub async fn run_cart_list(data_dir: &Path, json: bool) -> Result<()> {
    let source = match connect(data_dir) {
        Ok(source) => source,
        Err(e) => {
            // Ids are still readable without a backend
            warn!("{:#}", e);
            let store = CartStore::open(Box::new(FileStorage::new(data_dir, CART_STORAGE_KEY)));
            if json {
                return print_json(&store.entries());
            }
            print_ids(&store.list());
            return Ok(());
        }
    };

    let service = open_cart(data_dir, source);
    service.start().await;
    if json {
        return print_json(&service.details().await);
    }
    print_cart(&service).await;
    Ok(())
}

pub async fn run_cart_add(data_dir: &Path, product_id: &str) -> Result<()> {
    let product_id = product_id.trim();
    if product_id.is_empty() {
        anyhow::bail!("Product id must not be empty");
    }

    let service = open_cart(data_dir, connect(data_dir)?);
    if service.add(product_id).await {
        println!(
            "✅ Added {} to your cart ({} item(s)).",
            product_id,
            service.len().await
        );
    } else {
        println!("{} is already in your cart.", product_id);
    }

    let tracker = service.popularity();
    if !tracker.settle(PING_GRACE).await {
        warn!("Popularity update still pending; it will be dropped");
    }
    debug!(
        "Popularity pings: {} sent, {} failed",
        tracker.sent_count(),
        tracker.failed_count()
    );
    Ok(())
}

pub async fn run_cart_remove(data_dir: &Path, product_id: &str) -> Result<()> {
    let product_id = product_id.trim();
    let service = open_cart(data_dir, connect(data_dir)?);
    if !service.contains(product_id).await {
        println!("{} is not in your cart.", product_id);
        return Ok(());
    }

    service.remove(product_id).await;
    println!("✅ Removed {} from your cart.", product_id);
    Ok(())
}

fn print_ids(ids: &[String]) {
    if ids.is_empty() {
        println!("🛒 Your cart is empty.");
        return;
    }
    println!("🛒 {} item(s) in your cart (details unavailable):", ids.len());
    for (i, id) in ids.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, id);
    }
}

async fn print_cart(service: &CartService) {
    let ids = service.list().await;
    if ids.is_empty() {
        println!("🛒 Your cart is empty.");
        return;
    }

    let view = service.details().await;
    if let Some(error) = &view.error {
        println!("⚠️  Could not load product details: {}", error);
        print_ids(&ids);
        return;
    }

    let pending = if view.loading { "loading…" } else { "not found in the catalog" };
    println!("🛒 {} item(s) in your cart:", ids.len());
    for (i, id) in ids.iter().enumerate() {
        match view.items.iter().find(|item| &item.id == id) {
            Some(product) => print_product(i, product),
            None => println!("  {:>2}. {}  ({})", i + 1, id, pending),
        }
    }

    let missing = ids.len() - view.items.len();
    if missing > 0 && !view.loading {
        println!("\n{} item(s) could not be found in the catalog.", missing);
    }
}
