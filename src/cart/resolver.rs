//! Detail resolver: turns cart ids into display-ready product records.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::store::most_recent_first;
use crate::api::CatalogSource;
use crate::domain::{CartEntry, ProductSummary};

/// Snapshot of the resolved cart details.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailView {
    /// Product records, most recently added first
    pub items: Vec<ProductSummary>,
    /// A fetch is outstanding
    pub loading: bool,
    /// Message of the last failed fetch
    pub error: Option<String>,
}

/// What happened to one `refresh` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No ids; details cleared without a remote call
    Empty,
    /// Details replaced with this many records
    Applied(usize),
    /// Fetch failed; details cleared and the error recorded
    Failed,
    /// A newer refresh started while this one was in flight; result dropped
    Superseded,
}

#[derive(Default)]
struct ResolverState {
    generation: u64,
    view: DetailView,
    /// Ids the last completed fetch was asked for
    resolved: HashSet<String>,
}

/// Holds the detail list for the current cart contents.
///
/// Every refresh takes a new generation number; a response that arrives after
/// a newer refresh has started is discarded, so the list always matches the
/// latest id set handed in.
#[derive(Clone)]
pub struct DetailResolver {
    source: Arc<dyn CatalogSource>,
    state: Arc<RwLock<ResolverState>>,
}

impl DetailResolver {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(ResolverState::default())),
        }
    }

    pub async fn view(&self) -> DetailView {
        self.state.read().await.view.clone()
    }

    /// View restricted to `ids`.
    ///
    /// Loading while a fetch is outstanding, or when some id was never part
    /// of a completed fetch. Ids a completed fetch did not return are simply
    /// absent.
    pub async fn view_for(&self, ids: &[String]) -> DetailView {
        let state = self.state.read().await;
        let listed: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut view = state.view.clone();
        view.items.retain(|item| listed.contains(item.id.as_str()));
        if view.error.is_none() && ids.iter().any(|id| !state.resolved.contains(id)) {
            view.loading = true;
        }
        view
    }

    /// Fetch records for `entries` and replace the held list.
    ///
    /// Never retried. Previous items stay visible while the fetch runs.
    pub async fn refresh(&self, entries: &[CartEntry]) -> RefreshOutcome {
        let mut seen = HashSet::new();
        let ids: Vec<String> = most_recent_first(entries)
            .into_iter()
            .filter(|&entry| seen.insert(entry.product_id.as_str()))
            .map(|entry| entry.product_id.clone())
            .collect();

        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            if ids.is_empty() {
                state.view = DetailView::default();
                state.resolved.clear();
                return RefreshOutcome::Empty;
            }
            state.view.loading = true;
            state.view.error = None;
            state.generation
        };

        debug!("Refreshing details for {} products (generation {})", ids.len(), generation);
        let result = self.source.products_by_ids(&ids).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                "Discarding detail response for generation {} (latest is {})",
                generation, state.generation
            );
            return RefreshOutcome::Superseded;
        }

        state.resolved = ids.iter().cloned().collect();
        match result {
            Ok(products) => {
                let items = order_by_ids(&ids, products);
                let count = items.len();
                state.view = DetailView {
                    items,
                    loading: false,
                    error: None,
                };
                RefreshOutcome::Applied(count)
            }
            Err(e) => {
                warn!("Failed to load cart details: {}", e);
                state.view = DetailView {
                    items: Vec::new(),
                    loading: false,
                    error: Some(e.to_string()),
                };
                RefreshOutcome::Failed
            }
        }
    }
}

/// Arrange `products` in the order of `ids`, dropping records that were not
/// asked for and duplicate records for the same id.
fn order_by_ids(ids: &[String], products: Vec<ProductSummary>) -> Vec<ProductSummary> {
    let mut by_id: HashMap<String, ProductSummary> = HashMap::new();
    for product in products {
        by_id.entry(product.id.clone()).or_insert(product);
    }
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
