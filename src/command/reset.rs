use std::path::Path;

use anyhow::Result;

use super::prompt;
use crate::config::ConfigStore;

pub async fn run_reset(data_dir: &Path, yes: bool) -> Result<()> {
    let store = ConfigStore::new(data_dir);

    if !store.config_path().exists() {
        println!("No saved configuration.");
        return Ok(());
    }

    if !yes {
        let answer = prompt("Remove the saved backend configuration? [y/N]: ")?.to_lowercase();
        if answer != "y" && answer != "yes" {
            println!("Configuration unchanged.");
            return Ok(());
        }
    }

    store.remove()?;
    println!("✅ Removed saved backend configuration.");
    Ok(())
}
