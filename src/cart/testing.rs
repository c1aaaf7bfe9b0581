//! In-memory doubles for the catalog and cart storage.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::storage::{CartStorage, StorageError};
use crate::api::CatalogError;
use crate::api::CatalogSource;
use crate::domain::{
    Collection, Festival, FestivalDetail, ProductFilter, ProductSummary, Region, SearchHit,
};

/// Minimal product record for tests
pub fn product(id: &str) -> ProductSummary {
    ProductSummary {
        id: id.to_string(),
        name: format!("Product {}", id),
        image: format!("https://img.example/{}.jpg", id),
        price: None,
        affiliate_link: format!("https://shop.example/{}", id),
        collection_name: None,
        created_at: None,
    }
}

fn injected(endpoint: &str) -> CatalogError {
    CatalogError::Transport {
        endpoint: endpoint.to_string(),
        message: "injected failure".to_string(),
    }
}

#[derive(Default)]
struct FakeState {
    products: Vec<ProductSummary>,
    regions: Vec<Region>,
    collections: Vec<Collection>,
    hits: Vec<SearchHit>,

    detail_calls: Vec<Vec<String>>,
    detail_gates: HashMap<usize, oneshot::Receiver<()>>,
    existence_calls: usize,
    existence_gate: Option<oneshot::Receiver<()>>,
    popularity_calls: Vec<String>,
    search_calls: Vec<String>,

    fail_details: bool,
    fail_existence: bool,
    fail_lists: bool,
    fail_search: bool,
    fail_popularity: bool,
}

/// Scriptable `CatalogSource` that records every call.
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<FakeState>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(ids: &[&str]) -> Self {
        let catalog = Self::new();
        for id in ids {
            catalog.insert_product(product(id));
        }
        catalog
    }

    pub fn insert_product(&self, product: ProductSummary) {
        self.state.lock().unwrap().products.push(product);
    }

    pub fn set_regions(&self, regions: Vec<Region>) {
        self.state.lock().unwrap().regions = regions;
    }

    pub fn set_collections(&self, collections: Vec<Collection>) {
        self.state.lock().unwrap().collections = collections;
    }

    pub fn set_hits(&self, hits: Vec<SearchHit>) {
        self.state.lock().unwrap().hits = hits;
    }

    pub fn fail_details(&self, fail: bool) {
        self.state.lock().unwrap().fail_details = fail;
    }

    pub fn fail_existence(&self, fail: bool) {
        self.state.lock().unwrap().fail_existence = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    pub fn fail_search(&self, fail: bool) {
        self.state.lock().unwrap().fail_search = fail;
    }

    pub fn fail_popularity(&self, fail: bool) {
        self.state.lock().unwrap().fail_popularity = fail;
    }

    /// Hold the `n`th (1-based) detail fetch until the returned sender fires
    /// or is dropped.
    pub fn gate_detail_call(&self, n: usize) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().detail_gates.insert(n, rx);
        tx
    }

    /// Hold the next existence query until the returned sender fires.
    pub fn gate_existence(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().existence_gate = Some(rx);
        tx
    }

    pub fn detail_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().detail_calls.clone()
    }

    pub fn detail_call_count(&self) -> usize {
        self.state.lock().unwrap().detail_calls.len()
    }

    pub fn existence_call_count(&self) -> usize {
        self.state.lock().unwrap().existence_calls
    }

    pub fn popularity_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().popularity_calls.clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().search_calls.clone()
    }

    /// Yield until at least `n` detail fetches have started.
    pub async fn wait_for_detail_calls(&self, n: usize) {
        while self.detail_call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_existence_calls(&self, n: usize) {
        while self.existence_call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    fn lookup(&self, ids: &[String]) -> Vec<ProductSummary> {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<ProductSummary>, CatalogError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.detail_calls.push(ids.to_vec());
            let n = state.detail_calls.len();
            state.detail_gates.remove(&n)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.state.lock().unwrap().fail_details {
            return Err(injected("products"));
        }
        Ok(self.lookup(ids))
    }

    async fn existing_product_ids(&self, ids: &[String]) -> Result<HashSet<String>, CatalogError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.existence_calls += 1;
            state.existence_gate.take()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.state.lock().unwrap().fail_existence {
            return Err(injected("products"));
        }
        Ok(self.lookup(ids).into_iter().map(|p| p.id).collect())
    }

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, CatalogError> {
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(injected("products"));
        }
        let mut products: Vec<ProductSummary> = state
            .products
            .iter()
            .filter(|p| match &filter.collection {
                Some(name) => p
                    .collection_name
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(name)),
                None => true,
            })
            .cloned()
            .collect();
        if filter.newest_first {
            products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        if let Some(limit) = filter.limit {
            products.truncate(limit);
        }
        Ok(products)
    }

    async fn regions(&self) -> Result<Vec<Region>, CatalogError> {
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(injected("states"));
        }
        Ok(state.regions.clone())
    }

    async fn collections(&self) -> Result<Vec<Collection>, CatalogError> {
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(injected("collections"));
        }
        Ok(state.collections.clone())
    }

    async fn festivals(&self) -> Result<Vec<Festival>, CatalogError> {
        Ok(Vec::new())
    }

    async fn festival_detail(&self, _slug: &str) -> Result<Option<FestivalDetail>, CatalogError> {
        Ok(None)
    }

    async fn search_all(&self, term: &str) -> Result<Vec<SearchHit>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.search_calls.push(term.to_string());
        if state.fail_search {
            return Err(injected("search_all"));
        }
        Ok(state.hits.clone())
    }

    async fn record_popularity(&self, product_id: &str) -> Result<(), CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.popularity_calls.push(product_id.to_string());
        if state.fail_popularity {
            return Err(injected("increment_product_popularity"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    data: Option<String>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Shared in-memory `CartStorage`; clones see the same slot.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: &str) -> Self {
        let storage = Self::new();
        storage.inner.lock().unwrap().data = Some(data.to_string());
        storage
    }

    pub fn data(&self) -> Option<String> {
        self.inner.lock().unwrap().data.clone()
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    fn error(action: &'static str) -> StorageError {
        StorageError::Io {
            action,
            path: PathBuf::from("memory"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let state = self.inner.lock().unwrap();
        if state.fail_reads {
            return Err(Self::error("read"));
        }
        Ok(state.data.clone())
    }

    fn write(&self, data: &str) -> Result<(), StorageError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_writes {
            return Err(Self::error("write"));
        }
        state.writes += 1;
        state.data = Some(data.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_writes {
            return Err(Self::error("remove"));
        }
        state.data = None;
        Ok(())
    }
}
