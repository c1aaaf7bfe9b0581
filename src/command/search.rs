use std::path::Path;

use anyhow::Result;
use tracing::warn;

use super::{connect, format_price, print_json};
use crate::search::{search_remote, SearchIndex, SearchOutcome};

pub async fn run_search(data_dir: &Path, query: &str, remote: bool, json: bool) -> Result<()> {
    let source = connect(data_dir)?;

    let outcome = if remote {
        // A failed remote search reads as no results
        search_remote(source.as_ref(), query).await.unwrap_or_else(|e| {
            warn!("Search failed: {}", e);
            SearchOutcome::NoResults
        })
    } else {
        SearchIndex::preload(source).await.rank(query)
    };

    if json {
        return print_json(&outcome);
    }
    print_outcome(query, &outcome);
    Ok(())
}

fn print_outcome(query: &str, outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Prompt => println!("Type something to search the catalog."),
        SearchOutcome::NoResults => println!("No results for \"{}\".", query.trim()),
        SearchOutcome::Sections(sections) => {
            for section in sections {
                println!("\n{} ({})", section.kind.title(), section.items.len());
                for item in &section.items {
                    if item.price.is_some() {
                        let price = format_price(item.price);
                        println!("  {}  ({})  {}", item.name, price, item.link);
                    } else {
                        println!("  {}  {}", item.name, item.link);
                    }
                }
            }
        }
    }
}
