//! Serialized cart schema.
//!
//! Current format: `{"version": 1, "items": [{"productId": "...", "addedAt": 1700000000000}]}`.
//! Older storefront builds wrote either a bare array of entry objects (no
//! version) or a bare array of product id strings.

use serde::Serialize;
use serde_json::Value;

use crate::domain::CartEntry;

/// Version written by this build
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Serialize)]
struct StoredCart<'a> {
    version: u64,
    items: &'a [CartEntry],
}

/// Result of reading a stored payload
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Payload already in the current schema
    Current(Vec<CartEntry>),
    /// Unversioned entry array; usable but should be rewritten
    Migrated(Vec<CartEntry>),
    /// Unusable payload; the cart must reset
    Rejected(String),
}

pub fn encode(entries: &[CartEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StoredCart {
        version: SCHEMA_VERSION,
        items: entries,
    })
}

pub fn decode(raw: &str) -> Decoded {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Decoded::Rejected(format!("corrupt cart data: {}", e)),
    };

    match value {
        Value::Object(mut map) => match map.get("version").and_then(Value::as_u64) {
            Some(SCHEMA_VERSION) => {
                let items = map.remove("items").unwrap_or(Value::Null);
                match serde_json::from_value::<Vec<CartEntry>>(items) {
                    Ok(entries) => Decoded::Current(dedupe(entries)),
                    Err(e) => Decoded::Rejected(format!("invalid cart entries: {}", e)),
                }
            }
            Some(other) => Decoded::Rejected(format!("unsupported cart schema version {}", other)),
            None => Decoded::Rejected("cart data has no schema version".to_string()),
        },
        Value::Array(items) => {
            if items.iter().any(|item| !item.is_object()) {
                return Decoded::Rejected("legacy id-only cart format".to_string());
            }
            match serde_json::from_value::<Vec<CartEntry>>(Value::Array(items)) {
                Ok(entries) => Decoded::Migrated(dedupe(entries)),
                Err(e) => Decoded::Rejected(format!("invalid cart entries: {}", e)),
            }
        }
        _ => Decoded::Rejected("unexpected cart data".to_string()),
    }
}

/// Keep the first entry for each product id, dropping blank ids.
fn dedupe(entries: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| !entry.product_id.is_empty() && seen.insert(entry.product_id.clone()))
        .collect()
}
