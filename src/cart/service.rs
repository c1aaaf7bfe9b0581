//! Cart service: the single shared entry point for cart state.
//!
//! Built once at startup and cloned into whatever needs the cart. Mutations
//! are applied and persisted under the store's write guard, then the guard is
//! released before any network call starts.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::resolver::{DetailResolver, DetailView, RefreshOutcome};
use super::store::CartStore;
use crate::api::CatalogSource;
use crate::popularity::PopularityTracker;

#[derive(Clone)]
pub struct CartService {
    store: Arc<RwLock<CartStore>>,
    resolver: DetailResolver,
    source: Arc<dyn CatalogSource>,
    popularity: PopularityTracker,
    validated: Arc<AtomicBool>,
}

impl CartService {
    pub fn new(
        store: CartStore,
        source: Arc<dyn CatalogSource>,
        popularity: PopularityTracker,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            resolver: DetailResolver::new(Arc::clone(&source)),
            source,
            popularity,
            validated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn popularity(&self) -> &PopularityTracker {
        &self.popularity
    }

    /// Validate stored ids against the catalog, then load details.
    pub async fn start(&self) -> RefreshOutcome {
        self.validate_on_load().await;
        self.refresh().await
    }

    /// Drop stored ids that no longer exist remotely. Runs at most once per
    /// service; later calls return immediately.
    ///
    /// Returns the pruned ids. Nothing is pruned when the existence query
    /// fails, and ids added while the query is in flight are kept.
    pub async fn validate_on_load(&self) -> Vec<String> {
        if self.validated.swap(true, Ordering::SeqCst) {
            return Vec::new();
        }

        let ids = self.store.read().await.list();
        if ids.is_empty() {
            return Vec::new();
        }

        let existing = match self.source.existing_product_ids(&ids).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Skipping cart validation, existence check failed: {}", e);
                return Vec::new();
            }
        };

        let stale: HashSet<String> = ids.into_iter().filter(|id| !existing.contains(id)).collect();
        if stale.is_empty() {
            debug!("All cart items still exist");
            return Vec::new();
        }

        let removed = self.store.write().await.remove_all(&stale);
        info!("Removed {} unavailable items from the cart", removed.len());
        removed
    }

    /// Add a product. Returns false when it was already in the cart.
    pub async fn add(&self, product_id: &str) -> bool {
        let inserted = self.store.write().await.add(product_id);
        if !inserted {
            return false;
        }

        self.popularity.notify_added(product_id);
        self.refresh().await;
        true
    }

    /// Remove a product. Returns false when it was not in the cart.
    pub async fn remove(&self, product_id: &str) -> bool {
        let removed = self.store.write().await.remove(product_id);
        if removed {
            self.refresh().await;
        }
        removed
    }

    pub async fn contains(&self, product_id: &str) -> bool {
        self.store.read().await.contains(product_id)
    }

    /// Product ids, most recently added first.
    pub async fn list(&self) -> Vec<String> {
        self.store.read().await.list()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Re-fetch details for the current contents.
    pub async fn refresh(&self) -> RefreshOutcome {
        let entries = self.store.read().await.entries().to_vec();
        self.resolver.refresh(&entries).await
    }

    /// Current details, restricted to ids still in the cart.
    ///
    /// An id added since the last completed fetch counts as loading, not as
    /// an error. Ids that fetch did not return are just missing.
    pub async fn details(&self) -> DetailView {
        let ids = self.list().await;
        self.resolver.view_for(&ids).await
    }
}
