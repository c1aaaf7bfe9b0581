use std::path::Path;

use anyhow::Result;

use crate::cart::{CartStore, FileStorage, CART_STORAGE_KEY};
use crate::config::ConfigStore;
use crate::popularity;

pub async fn run_status(data_dir: &Path) -> Result<()> {
    let store = ConfigStore::new(data_dir);

    match store.load()? {
        Some((config, source)) => {
            println!("✅ Catalog backend configured");
            println!("   URL: {}", config.api_url);
            println!("   Source: {}", source);
        }
        None => {
            println!("❌ No catalog backend configured");
            println!("   Run 'antiqkart configure' to set one up.");
        }
    }

    let storage = FileStorage::new(data_dir, CART_STORAGE_KEY);
    let path = storage.path().to_path_buf();
    let cart = CartStore::open(Box::new(storage));
    if cart.is_empty() {
        println!("🛒 Cart: empty ({})", path.display());
    } else {
        println!("🛒 Cart: {} item(s) in {}", cart.len(), path.display());
    }

    if !popularity::is_tracking_enabled() {
        println!(
            "   Popularity tracking disabled ({} is set)",
            popularity::DISABLE_TRACKING_ENV
        );
    }

    Ok(())
}
