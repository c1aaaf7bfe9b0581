//! Local cart store: the authoritative set of wishlist product ids.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::format::{self, Decoded};
use super::storage::CartStorage;
use crate::domain::CartEntry;

/// Order entries most recently added first.
///
/// Ties on `added_at` are broken by insertion position, later insertion
/// first: newest-on-top also holds for items added within the same
/// millisecond, rather than falling back to plain insertion order.
pub fn most_recent_first(entries: &[CartEntry]) -> Vec<&CartEntry> {
    let mut ordered: Vec<(usize, &CartEntry)> = entries.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| b.added_at.cmp(&a.added_at).then(ib.cmp(ia)));
    ordered.into_iter().map(|(_, entry)| entry).collect()
}

/// Set of cart entries with insertion-time metadata, persisted on every change.
///
/// Entries are kept in insertion order internally; `list()` projects them
/// most recent first. Storage failures are logged and never propagated.
pub struct CartStore {
    entries: Vec<CartEntry>,
    storage: Box<dyn CartStorage>,
}

impl CartStore {
    /// Load the cart from storage, resetting to empty on unusable data.
    pub fn open(storage: Box<dyn CartStorage>) -> Self {
        let mut needs_rewrite = false;

        let entries = match storage.read() {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match format::decode(&raw) {
                Decoded::Current(entries) => entries,
                Decoded::Migrated(entries) => {
                    info!(
                        "Migrating {} cart entries to schema v{}",
                        entries.len(),
                        format::SCHEMA_VERSION
                    );
                    needs_rewrite = true;
                    entries
                }
                Decoded::Rejected(reason) => {
                    warn!("{}. Resetting cart.", reason);
                    if let Err(e) = storage.clear() {
                        warn!("Failed to clear unusable cart data: {}", e);
                    }
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Failed to read cart storage, starting empty: {}", e);
                Vec::new()
            }
        };

        let store = Self { entries, storage };
        if needs_rewrite {
            store.persist();
        }
        debug!("Loaded cart with {} entries", store.entries.len());
        store
    }

    fn persist(&self) {
        match format::encode(&self.entries) {
            Ok(data) => {
                if let Err(e) = self.storage.write(&data) {
                    warn!("Failed to persist cart: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize cart: {}", e),
        }
    }

    /// Add `product_id` stamped with the current time. Returns false when it
    /// was already present.
    pub fn add(&mut self, product_id: &str) -> bool {
        self.add_at(product_id, Utc::now().timestamp_millis())
    }

    /// Add with an explicit timestamp (epoch milliseconds).
    pub fn add_at(&mut self, product_id: &str, added_at: i64) -> bool {
        if product_id.is_empty() {
            warn!("Ignoring add of an empty product id");
            return false;
        }
        if self.contains(product_id) {
            return false;
        }

        self.entries.push(CartEntry::new(product_id, added_at));
        self.persist();
        true
    }

    /// Remove `product_id`. Returns false when it was not present.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.product_id != product_id);
        if self.entries.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Remove every id in `ids`, returning the ones that were present.
    pub fn remove_all(&mut self, ids: &HashSet<String>) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            if ids.contains(&entry.product_id) {
                removed.push(entry.product_id.clone());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.persist();
        }
        removed
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.product_id == product_id)
    }

    /// Product ids, most recently added first.
    pub fn list(&self) -> Vec<String> {
        most_recent_first(&self.entries)
            .into_iter()
            .map(|entry| entry.product_id.clone())
            .collect()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
