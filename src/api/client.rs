use anyhow::Context;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::http::{send_with_retry, RetryPolicy};
use super::types::{ApiError, CatalogError};
use crate::config::BackendConfig;

/// Default request timeout in seconds
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of the REST interface exposed by the hosted backend
const REST_PREFIX: &str = "rest/v1/";

/// Default client version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string
fn build_user_agent() -> String {
    std::env::var("ANTIQKART_USER_AGENT")
        .unwrap_or_else(|_| format!("antiqkart/{}", DEFAULT_VERSION))
}

/// HTTP client for the hosted catalog backend
pub struct ApiClient {
    client: Client,
    user_agent: String,
    session_id: String,
    base_url: Url,
    anon_key: String,
}

impl ApiClient {
    /// Create a new API client for the given backend
    pub fn new(config: &BackendConfig) -> Result<Self, CatalogError> {
        let base_url = Self::rest_base(&config.api_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: build_user_agent(),
            session_id: Uuid::new_v4().to_string(),
            base_url,
            anon_key: config.anon_key.clone(),
        })
    }

    /// Normalise the project URL into the REST base (always ends with `/`).
    fn rest_base(api_url: &str) -> Result<Url, CatalogError> {
        let mut raw = api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| CatalogError::Config(format!("invalid API URL {}: {}", api_url, e)))?;
        base.join(REST_PREFIX)
            .map_err(|e| CatalogError::Config(format!("invalid API URL {}: {}", api_url, e)))
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CatalogError::Config(format!("bad endpoint {}: {}", endpoint, e)))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn decorate(&self, request: reqwest::RequestBuilder, request_id: &str) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", request_id)
            .header("x-client-session-id", &self.session_id)
    }

    async fn read_body(
        endpoint: &str,
        request_id: &str,
        response: reqwest::Response,
    ) -> Result<String, CatalogError> {
        let status = response.status();
        debug!("=== Catalog Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let api_error = ApiError::from_http_response(
                status.as_u16(),
                error_text,
                Some(request_id.to_string()),
            );
            error!(
                "{} request failed with HTTP {}: {}",
                endpoint, api_error.http_status, api_error.message
            );
            return Err(CatalogError::Api(api_error));
        }

        response.text().await.map_err(|e| CatalogError::Transport {
            endpoint: endpoint.to_string(),
            message: format!("failed to read response body: {}", e),
        })
    }

    /// `GET <table>?<params>` returning the raw JSON rows.
    pub async fn select_rows(
        &self,
        table: &str,
        params: &[(&str, String)],
        policy: RetryPolicy,
    ) -> Result<Vec<serde_json::Value>, CatalogError> {
        let url = self.build_url(table, params)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Catalog Request ===");
        debug!("URL: {}", url);

        let response = send_with_retry(policy, || {
            self.decorate(self.client.get(url.clone()), &request_id)
        })
        .await
        .with_context(|| format!("Failed to send request to {}", url))
        .map_err(|e| CatalogError::Transport {
            endpoint: table.to_string(),
            message: format!("{:#}", e),
        })?;

        let body = Self::read_body(table, &request_id, response).await?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Decode {
            endpoint: table.to_string(),
            message: e.to_string(),
        })
    }

    /// `POST rpc/<function>` with a JSON body. Empty responses decode as `null`.
    pub async fn call_rpc<T>(
        &self,
        function: &str,
        body: &T,
        policy: RetryPolicy,
    ) -> Result<serde_json::Value, CatalogError>
    where
        T: Serialize + Sync,
    {
        let endpoint = format!("rpc/{}", function);
        let url = self.build_url(&endpoint, &[])?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Catalog RPC ===");
        debug!("URL: {}", url);

        let response = send_with_retry(policy, || {
            self.decorate(self.client.post(url.clone()), &request_id)
                .header("Content-Type", "application/json")
                .json(body)
        })
        .await
        .with_context(|| format!("Failed to send request to {}", url))
        .map_err(|e| CatalogError::Transport {
            endpoint: endpoint.clone(),
            message: format!("{:#}", e),
        })?;

        let text = Self::read_body(&endpoint, &request_id, response).await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| CatalogError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> BackendConfig {
        BackendConfig {
            api_url: url.to_string(),
            anon_key: "anon-key".to_string(),
        }
    }

    #[test]
    fn test_build_user_agent() {
        let ua = build_user_agent();
        assert!(!ua.is_empty());
    }

    #[test]
    fn test_rest_base_with_and_without_slash() {
        let url = ApiClient::rest_base("https://abc.supabase.co").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/");

        let url = ApiClient::rest_base("https://abc.supabase.co/").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/");

        let url = ApiClient::rest_base("https://proxy.example.com/store").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/store/rest/v1/");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = ApiClient::new(&config("not a url")).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_build_url_encodes_filters() {
        let client = ApiClient::new(&config("https://abc.supabase.co")).unwrap();
        let url = client
            .build_url(
                "products",
                &[
                    ("select", "id,name".to_string()),
                    ("id", "in.(\"a\",\"b c\")".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/products");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("select".to_string(), "id,name".to_string()));
        assert_eq!(pairs[1], ("id".to_string(), "in.(\"a\",\"b c\")".to_string()));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = ApiClient::new(&config("https://abc.supabase.co")).unwrap();
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("anon-key"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
