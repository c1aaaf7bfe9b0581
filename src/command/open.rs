use std::path::Path;

use anyhow::{Context, Result};

use super::{
    catalog_failure, connect, print_json, run_cart_list, run_festivals, run_products, run_search,
    ProductsArgs,
};
use crate::catalog::Route;

/// Products shown on the home page
const HOME_LIMIT: usize = 8;

pub async fn run_open(data_dir: &Path, path: &str, json: bool) -> Result<()> {
    let route = Route::parse(path).with_context(|| format!("Unknown page: {}", path))?;

    match route {
        Route::Home => {
            println!("✨ New arrivals");
            let args = ProductsArgs {
                limit: Some(HOME_LIMIT),
                ..Default::default()
            };
            run_products(data_dir, args, json).await
        }
        Route::Shop => {
            let args = ProductsArgs {
                grouped: true,
                ..Default::default()
            };
            run_products(data_dir, args, json).await
        }
        Route::State(slug) => {
            let args = ProductsArgs {
                region: Some(slug),
                ..Default::default()
            };
            run_products(data_dir, args, json).await
        }
        Route::Collection(slug) => {
            let args = ProductsArgs {
                collection: Some(slug),
                ..Default::default()
            };
            run_products(data_dir, args, json).await
        }
        Route::States => {
            let regions = connect(data_dir)?
                .regions()
                .await
                .map_err(|e| catalog_failure("load states", e))?;
            if json {
                return print_json(&regions);
            }
            println!("States:");
            for region in &regions {
                println!("  {}  ({})", region.name, Route::state(&region.name));
            }
            Ok(())
        }
        Route::Collections => {
            let collections = connect(data_dir)?
                .collections()
                .await
                .map_err(|e| catalog_failure("load collections", e))?;
            if json {
                return print_json(&collections);
            }
            println!("Collections:");
            for collection in &collections {
                println!("  {}  ({})", collection.name, Route::collection(&collection.name));
            }
            Ok(())
        }
        Route::Festivals => run_festivals(data_dir, None, json).await,
        Route::Festival(slug) => run_festivals(data_dir, Some(&slug), json).await,
        Route::Cart => run_cart_list(data_dir, json).await,
        Route::Search(query) => run_search(data_dir, &query, false, json).await,
        Route::About => {
            println!("antiqkart curates handcrafted and heritage pieces from across India,");
            println!("linking each one to the artisan seller who makes it.");
            Ok(())
        }
        Route::Contact => {
            println!("Questions about a product? Use the seller link on its listing.");
            Ok(())
        }
    }
}
