//! Typed gateway over the hosted catalog.
//!
//! `CatalogSource` is the seam the cart, search and browsing code depend on;
//! `RestCatalog` implements it against the backend's REST interface. The
//! client is created once at startup and shared (`Arc`), so every request
//! reuses the same connection pool.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::ApiClient;
use super::http::RetryPolicy;
use super::types::{
    decode_rows, CatalogError, FestivalDetailRow, FestivalRow, IdRow, NamedImageRow,
    PopularityRequest, ProductRow, SearchAllRequest, SearchHitRow,
};
use crate::config::BackendConfig;
use crate::domain::{
    Collection, Festival, FestivalDetail, ProductFilter, ProductSummary, Region, SearchHit,
};

/// Columns selected for every product listing
pub const PRODUCT_COLUMNS: &str =
    "id,name,image,price,affiliate_link,created_at,collections(name)";

/// Stored procedure backing full-text search
const SEARCH_PROCEDURE: &str = "search_all";

/// Stored procedure bumping a product's popularity counter
const POPULARITY_PROCEDURE: &str = "increment_product_popularity";

/// Read interface over the remote catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the products whose ids are in `ids` (select-by-id-list).
    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<ProductSummary>, CatalogError>;

    /// Return the subset of `ids` that still exist remotely.
    async fn existing_product_ids(&self, ids: &[String]) -> Result<HashSet<String>, CatalogError>;

    /// Fetch products matching a server-side filter (select-all-with-filter).
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, CatalogError>;

    async fn regions(&self) -> Result<Vec<Region>, CatalogError>;

    async fn collections(&self) -> Result<Vec<Collection>, CatalogError>;

    /// Festivals, most recent first.
    async fn festivals(&self) -> Result<Vec<Festival>, CatalogError>;

    async fn festival_detail(&self, slug: &str) -> Result<Option<FestivalDetail>, CatalogError>;

    /// Run the backend's tagged full-text search procedure.
    async fn search_all(&self, term: &str) -> Result<Vec<SearchHit>, CatalogError>;

    /// Popularity side channel; the response is ignored.
    async fn record_popularity(&self, product_id: &str) -> Result<(), CatalogError>;
}

/// Build a PostgREST `in.(...)` list, quoting every value.
fn in_list(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Case-insensitive exact match on a name column.
///
/// `%`, `_` and `\` are escaped for LIKE. PostgREST turns every `*` into a
/// wildcard with no escape, so names containing one use a case-sensitive `eq`.
fn name_match(name: &str) -> String {
    if name.contains('*') {
        return format!("eq.{}", name);
    }
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("ilike.{}", escaped)
}

/// Translate a `ProductFilter` into query parameters.
fn filter_params(filter: &ProductFilter) -> Vec<(&'static str, String)> {
    let mut select = PRODUCT_COLUMNS.to_string();
    let mut params = Vec::new();

    if let Some(collection) = &filter.collection {
        // Embedded inner join turns the collection name into a row filter
        select = select.replace("collections(name)", "collections!inner(name)");
        params.push(("collections.name", name_match(collection)));
    }
    if let Some(region) = &filter.region {
        select.push_str(",states!inner(name)");
        params.push(("states.name", name_match(region)));
    }
    if filter.gi_tagged {
        params.push(("is_gi_tagged", "eq.true".to_string()));
    }
    if filter.newest_first {
        params.push(("order", "created_at.desc".to_string()));
    }
    if let Some(limit) = filter.limit {
        params.push(("limit", limit.to_string()));
    }

    params.insert(0, ("select", select));
    params
}

/// REST implementation of `CatalogSource`.
#[derive(Clone, Debug)]
pub struct RestCatalog {
    inner: Arc<ApiClient>,
}

impl RestCatalog {
    pub fn new(config: &BackendConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            inner: Arc::new(ApiClient::new(config)?),
        })
    }

    async fn named_rows(&self, table: &str) -> Result<Vec<NamedImageRow>, CatalogError> {
        let rows = self
            .inner
            .select_rows(
                table,
                &[
                    ("select", "id,name,image".to_string()),
                    ("order", "name.asc".to_string()),
                ],
                RetryPolicy::BACKGROUND,
            )
            .await?;
        Ok(decode_rows(rows, table))
    }
}

#[async_trait]
impl CatalogSource for RestCatalog {
    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<ProductSummary>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .inner
            .select_rows(
                "products",
                &[("select", PRODUCT_COLUMNS.to_string()), ("id", in_list(ids))],
                RetryPolicy::NONE,
            )
            .await?;
        let products: Vec<ProductSummary> = decode_rows::<ProductRow>(rows, "products")
            .into_iter()
            .map(ProductSummary::from)
            .collect();
        debug!("Resolved {}/{} products by id", products.len(), ids.len());
        Ok(products)
    }

    async fn existing_product_ids(&self, ids: &[String]) -> Result<HashSet<String>, CatalogError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = self
            .inner
            .select_rows(
                "products",
                &[("select", "id".to_string()), ("id", in_list(ids))],
                RetryPolicy::NONE,
            )
            .await?;
        Ok(decode_rows::<IdRow>(rows, "products")
            .into_iter()
            .map(|row| row.id)
            .collect())
    }

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, CatalogError> {
        let rows = self
            .inner
            .select_rows("products", &filter_params(filter), RetryPolicy::BACKGROUND)
            .await?;
        Ok(decode_rows::<ProductRow>(rows, "products")
            .into_iter()
            .map(ProductSummary::from)
            .collect())
    }

    async fn regions(&self) -> Result<Vec<Region>, CatalogError> {
        Ok(self
            .named_rows("states")
            .await?
            .into_iter()
            .map(Region::from)
            .collect())
    }

    async fn collections(&self) -> Result<Vec<Collection>, CatalogError> {
        Ok(self
            .named_rows("collections")
            .await?
            .into_iter()
            .map(Collection::from)
            .collect())
    }

    async fn festivals(&self) -> Result<Vec<Festival>, CatalogError> {
        let rows = self
            .inner
            .select_rows(
                "festivals",
                &[
                    ("select", "id,name,slug,banner_image".to_string()),
                    ("order", "start_date.desc".to_string()),
                ],
                RetryPolicy::BACKGROUND,
            )
            .await?;
        Ok(decode_rows::<FestivalRow>(rows, "festivals")
            .into_iter()
            .map(Festival::from)
            .collect())
    }

    async fn festival_detail(&self, slug: &str) -> Result<Option<FestivalDetail>, CatalogError> {
        let select = format!(
            "name,banner_image,festival_products(products({}))",
            PRODUCT_COLUMNS
        );
        let rows = self
            .inner
            .select_rows(
                "festivals",
                &[
                    ("select", select),
                    ("slug", format!("eq.{}", slug)),
                    ("limit", "1".to_string()),
                ],
                RetryPolicy::BACKGROUND,
            )
            .await?;
        Ok(decode_rows::<FestivalDetailRow>(rows, "festivals")
            .into_iter()
            .next()
            .map(FestivalDetail::from))
    }

    async fn search_all(&self, term: &str) -> Result<Vec<SearchHit>, CatalogError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let value = self
            .inner
            .call_rpc(
                SEARCH_PROCEDURE,
                &SearchAllRequest { search_term: term },
                RetryPolicy::NONE,
            )
            .await?;
        let rows = match value {
            serde_json::Value::Array(rows) => rows,
            serde_json::Value::Null => Vec::new(),
            other => {
                return Err(CatalogError::Decode {
                    endpoint: SEARCH_PROCEDURE.to_string(),
                    message: format!("expected an array of rows, got {}", other),
                })
            }
        };
        Ok(decode_rows::<SearchHitRow>(rows, SEARCH_PROCEDURE)
            .into_iter()
            .map(SearchHit::from)
            .collect())
    }

    async fn record_popularity(&self, product_id: &str) -> Result<(), CatalogError> {
        self.inner
            .call_rpc(
                POPULARITY_PROCEDURE,
                &PopularityRequest { product_id },
                RetryPolicy::BACKGROUND,
            )
            .await?;
        Ok(())
    }
}
