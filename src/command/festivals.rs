use std::path::Path;

use anyhow::Result;

use super::{catalog_failure, connect, print_json, print_product};

pub async fn run_festivals(data_dir: &Path, slug: Option<&str>, json: bool) -> Result<()> {
    let source = connect(data_dir)?;

    let Some(slug) = slug else {
        let festivals = source
            .festivals()
            .await
            .map_err(|e| catalog_failure("load festivals", e))?;
        if json {
            return print_json(&festivals);
        }
        if festivals.is_empty() {
            println!("No festivals right now.");
            return Ok(());
        }
        println!("🎉 Festivals:");
        for festival in &festivals {
            println!("  {}  (/festivals/{})", festival.name, festival.slug);
        }
        return Ok(());
    };

    let detail = source
        .festival_detail(slug)
        .await
        .map_err(|e| catalog_failure(&format!("load festival '{}'", slug), e))?;
    if json {
        return print_json(&detail);
    }

    match detail {
        Some(detail) => {
            println!("🎉 {}", detail.name);
            if let Some(banner) = &detail.banner_image {
                println!("   {}", banner);
            }
            if detail.products.is_empty() {
                println!("No products featured yet.");
            }
            for (i, product) in detail.products.iter().enumerate() {
                print_product(i, product);
            }
        }
        None => println!("Festival '{}' not found.", slug),
    }
    Ok(())
}
