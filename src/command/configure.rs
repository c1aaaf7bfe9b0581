use std::path::Path;

use anyhow::Result;

use super::prompt;
use crate::config::{BackendConfig, ConfigStore};

pub async fn run_configure(
    data_dir: &Path,
    api_url: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let store = ConfigStore::new(data_dir);

    if let Some((_, source)) = store.load()? {
        println!("⚠️  A backend is already configured (from {}).", source);
        let answer = prompt("Replace the saved configuration? [y/N]: ")?.to_lowercase();
        if answer != "y" && answer != "yes" {
            println!("Configuration unchanged.");
            return Ok(());
        }
    }

    let api_url = match api_url {
        Some(url) => url,
        None => prompt("Backend URL: ")?,
    };
    let anon_key = match api_key {
        Some(key) => key,
        None => prompt("Public API key: ")?,
    };

    // Reject malformed URLs before saving
    let parsed = url::Url::parse(api_url.trim())
        .map_err(|e| anyhow::anyhow!("Invalid backend URL '{}': {}", api_url, e))?;

    store.save(&BackendConfig {
        api_url: parsed.to_string(),
        anon_key: anon_key.trim().to_string(),
    })?;

    println!("✅ Saved backend configuration to {}", store.config_path().display());
    Ok(())
}
