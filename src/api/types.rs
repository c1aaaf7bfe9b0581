//! Row schemas and error types for the catalog backend.
//!
//! Rows are decoded one at a time so that a single malformed record is
//! dropped instead of failing the whole response.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    Collection, Festival, FestivalDetail, ProductSummary, Region, ResultKind, SearchHit,
};

// ============================================================================
// Row decoding helpers
// ============================================================================

/// Identifiers may come back as strings (uuid) or integers (serial keys).
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(s) if !s.is_empty() => Ok(s),
        RawId::Text(_) => Err(serde::de::Error::custom("empty identifier")),
        RawId::Int(n) => Ok(n.to_string()),
    }
}

/// Price columns were historically stored both as numbers and as text.
/// Non-finite values (`"NaN"`, `"inf"`) count as no price.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    let price = match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(price.filter(|p| p.is_finite()))
}

/// Accepts `timestamptz` (RFC 3339) and plain `timestamp` columns.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|naive| naive.and_utc())
                    .ok()
            })
    }))
}

/// Decode each JSON row independently, skipping rows that do not match `T`.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<serde_json::Value>, table: &str) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Dropping malformed {} row: {}", table, e);
                None
            }
        })
        .collect();

    if decoded.len() != total {
        warn!(
            "Decoded {}/{} {} rows ({} dropped)",
            decoded.len(),
            total,
            table,
            total - decoded.len()
        );
    }
    decoded
}

// ============================================================================
// Table rows
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct CollectionRef {
    pub name: String,
}

/// Row of the `products` table with its embedded collection.
#[derive(Debug, Deserialize)]
pub(super) struct ProductRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    pub affiliate_link: String,
    #[serde(default)]
    pub collections: Option<CollectionRef>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for ProductSummary {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image.unwrap_or_default(),
            price: row.price,
            affiliate_link: row.affiliate_link,
            collection_name: row.collections.map(|c| c.name),
            created_at: row.created_at,
        }
    }
}

/// Only the primary key, used by cart validation.
#[derive(Debug, Deserialize)]
pub(super) struct IdRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

/// Shared shape of the `states` and `collections` tables.
#[derive(Debug, Deserialize)]
pub(super) struct NamedImageRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<NamedImageRow> for Region {
    fn from(row: NamedImageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image.unwrap_or_default(),
        }
    }
}

impl From<NamedImageRow> for Collection {
    fn from(row: NamedImageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FestivalRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub banner_image: Option<String>,
}

impl From<FestivalRow> for Festival {
    fn from(row: FestivalRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            banner_image: row.banner_image,
        }
    }
}

/// Join row of `festival_products`; the embedded product may be null when the
/// product was deleted.
#[derive(Debug, Deserialize)]
pub(super) struct FestivalProductLink {
    #[serde(default)]
    pub products: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FestivalDetailRow {
    pub name: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub festival_products: Vec<FestivalProductLink>,
}

impl From<FestivalDetailRow> for FestivalDetail {
    fn from(row: FestivalDetailRow) -> Self {
        let embedded: Vec<serde_json::Value> = row
            .festival_products
            .into_iter()
            .filter_map(|link| link.products)
            .filter(|value| !value.is_null())
            .collect();
        let products = decode_rows::<ProductRow>(embedded, "festival product")
            .into_iter()
            .map(ProductSummary::from)
            .collect();

        Self {
            name: row.name,
            banner_image: row.banner_image,
            products,
        }
    }
}

/// Row of the `search_all` procedure.
#[derive(Debug, Deserialize)]
pub(super) struct SearchHitRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub result_type: ResultKind,
    #[serde(default)]
    pub image: Option<String>,
    pub link: String,
}

impl From<SearchHitRow> for SearchHit {
    fn from(row: SearchHitRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            kind: row.result_type,
            image: row.image.unwrap_or_default(),
            link: row.link,
        }
    }
}

// ============================================================================
// RPC bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub(super) struct SearchAllRequest<'a> {
    pub search_term: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct PopularityRequest<'a> {
    pub product_id: &'a str,
}

// ============================================================================
// API Status Codes
// ============================================================================

/// Coarse classification of backend HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Ok,
    /// Client closed the request - retryable
    Cancelled,
    Unknown,
    /// 5xx - retryable
    Unavailable,
    /// Table, view or procedure does not exist
    NotFound,
    /// Malformed filter or body
    InvalidArgument,
    /// Rate limit exceeded - retryable
    ResourceExhausted,
    /// Anon key missing or rejected
    Unauthenticated,
    /// Row level security denied the request
    PermissionDenied,
    /// Gateway timeout - retryable
    DeadlineExceeded,
}

impl ApiStatus {
    /// Convert from HTTP status code to internal API status
    pub fn from_http_status(http_status: u16) -> Self {
        match http_status {
            200..=299 => ApiStatus::Ok,
            400 => ApiStatus::InvalidArgument,
            401 => ApiStatus::Unauthenticated,
            403 => ApiStatus::PermissionDenied,
            404 => ApiStatus::NotFound,
            408 => ApiStatus::DeadlineExceeded,
            429 => ApiStatus::ResourceExhausted,
            499 => ApiStatus::Cancelled,
            504 => ApiStatus::DeadlineExceeded,
            500..=599 => ApiStatus::Unavailable,
            _ => ApiStatus::Unknown,
        }
    }

    /// Check if the request may succeed when repeated unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiStatus::Cancelled
                | ApiStatus::Unavailable
                | ApiStatus::ResourceExhausted
                | ApiStatus::DeadlineExceeded
        )
    }

    /// Check if this error is caused by local configuration (bad key, URL)
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ApiStatus::Unauthenticated | ApiStatus::PermissionDenied | ApiStatus::NotFound
        )
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            ApiStatus::Ok => "Success",
            ApiStatus::Cancelled => "Request was cancelled",
            ApiStatus::Unknown => "Unknown error occurred",
            ApiStatus::Unavailable => "Catalog service temporarily unavailable",
            ApiStatus::NotFound => "Catalog endpoint not found",
            ApiStatus::InvalidArgument => "Invalid catalog query",
            ApiStatus::ResourceExhausted => "Rate limit exceeded. Please wait and try again",
            ApiStatus::Unauthenticated => {
                "Catalog rejected the API key. Run 'antiqkart configure' to update it"
            }
            ApiStatus::PermissionDenied => "Catalog denied access to this resource",
            ApiStatus::DeadlineExceeded => "Request timed out",
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_message())
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Backend error with status code and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: ApiStatus,
    pub http_status: u16,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    /// Create from HTTP status code and response body
    pub fn from_http_response(http_status: u16, body: String, request_id: Option<String>) -> Self {
        let status = ApiStatus::from_http_status(http_status);
        let message = if status.is_configuration_error() || body.trim().is_empty() {
            format!("Catalog error (HTTP {}): {}", http_status, status.error_message())
        } else {
            format!("Catalog error (HTTP {}): {}", http_status, body.trim())
        };

        Self {
            status,
            http_status,
            message,
            request_id,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (request {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors surfaced by the catalog gateway.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog configuration: {0}")]
    Config(String),

    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl CatalogError {
    pub fn status(&self) -> Option<ApiStatus> {
        match self {
            CatalogError::Api(e) => Some(e.status),
            _ => None,
        }
    }
}
