//! HTTP client for the remote products API
//!
//! The client is reconfigured per store before any batch is sent:
//! - `configure` validates the endpoint, store ID, and key
//! - `submit_batch` posts one batch as a JSON array and maps failures
//!   to [`RemoteSyncError`]

use super::error::{ConfigError, RemoteSyncError};
use super::payload::ProductPayload;
use crate::models::{ProductRecord, RemoteClientConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

const ACCESS_TOKEN_HEADER: &str = "X-Extend-Access-Token";
const API_VERSION_ACCEPT: &str = "application/json; version=2021-04-01";

/// Client for submitting product batches to the remote service
#[async_trait]
pub trait RemoteSyncClient: Send + Sync {
    /// Validate and apply endpoint settings for the next store
    async fn configure(&self, config: &RemoteClientConfig) -> Result<(), ConfigError>;

    /// Submit a batch of products, tagged with its 1-based batch number
    async fn submit_batch(
        &self,
        products: &[ProductRecord],
        batch_number: usize,
    ) -> Result<(), RemoteSyncError>;
}

/// Transport settings for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Endpoint resolved from a validated [`RemoteClientConfig`]
#[derive(Debug, Clone)]
struct Endpoint {
    products_url: Url,
    api_key: String,
}

impl Endpoint {
    fn parse(config: &RemoteClientConfig) -> Result<Self, ConfigError> {
        let raw = config.api_url.trim();
        let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        let store_id = config.api_store_id.trim();
        if store_id.is_empty() {
            return Err(ConfigError::MissingStoreId);
        }
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["stores", store_id, "products"]);
        url.query_pairs_mut()
            .append_pair("batch", "true")
            .append_pair("upsert", "true");

        Ok(Self {
            products_url: url,
            api_key: api_key.to_string(),
        })
    }
}

/// Validate remote settings without applying them
pub fn validate(config: &RemoteClientConfig) -> Result<(), ConfigError> {
    Endpoint::parse(config).map(|_| ())
}

/// reqwest-backed [`RemoteSyncClient`]
pub struct HttpProductsClient {
    client: Client,
    endpoint: RwLock<Option<Endpoint>>,
}

impl HttpProductsClient {
    /// Create a new, unconfigured client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(API_VERSION_ACCEPT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: RwLock::new(None),
        })
    }

    /// Products URL of the currently applied configuration
    #[cfg(test)]
    pub(crate) async fn products_url(&self) -> Option<String> {
        self.endpoint
            .read()
            .await
            .as_ref()
            .map(|e| e.products_url.to_string())
    }
}

#[async_trait]
impl RemoteSyncClient for HttpProductsClient {
    async fn configure(&self, config: &RemoteClientConfig) -> Result<(), ConfigError> {
        let parsed = Endpoint::parse(config);
        let mut endpoint = self.endpoint.write().await;
        match parsed {
            Ok(parsed) => {
                debug!(url = %parsed.products_url, "Configured products API endpoint");
                *endpoint = Some(parsed);
                Ok(())
            }
            Err(err) => {
                // Never leave a previous store's credentials in place
                *endpoint = None;
                Err(err)
            }
        }
    }

    async fn submit_batch(
        &self,
        products: &[ProductRecord],
        batch_number: usize,
    ) -> Result<(), RemoteSyncError> {
        let endpoint = self
            .endpoint
            .read()
            .await
            .clone()
            .ok_or(RemoteSyncError::NotConfigured)?;

        let payload: Vec<ProductPayload> = products.iter().map(ProductPayload::from).collect();
        let body = serde_json::to_vec(&payload)?;

        let response = self
            .client
            .post(endpoint.products_url.clone())
            .header(ACCESS_TOKEN_HEADER, endpoint.api_key.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteSyncError::Rejected { status, body });
        }

        info!(
            batch = batch_number,
            products = products.len(),
            status = status.as_u16(),
            "Products batch accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockito::Matcher;

    fn remote_config(url: &str) -> RemoteClientConfig {
        RemoteClientConfig {
            api_url: url.to_string(),
            api_store_id: "store-abc".to_string(),
            api_key: "secret".to_string(),
        }
    }

    fn product(sku: &str) -> ProductRecord {
        ProductRecord {
            id: 1,
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            price: 10.0,
            currency: "USD".to_string(),
            store_ids: vec![1],
            updated_at: Utc::now(),
            type_id: "simple".to_string(),
            category: None,
            description: None,
            image_url: None,
            parent_sku: None,
        }
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(matches!(
            validate(&remote_config("not a url")),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate(&remote_config("ftp://api.example.com")),
            Err(ConfigError::UnsupportedScheme(_))
        ));

        let mut config = remote_config("https://api.example.com");
        config.api_key = "  ".to_string();
        assert_eq!(validate(&config), Err(ConfigError::MissingApiKey));

        let mut config = remote_config("https://api.example.com");
        config.api_store_id = String::new();
        assert_eq!(validate(&config), Err(ConfigError::MissingStoreId));
    }

    #[tokio::test]
    async fn test_products_url_joins_store_path() {
        let client = HttpProductsClient::new(ClientConfig::default()).unwrap();
        client
            .configure(&remote_config("https://api.example.com/v1/"))
            .await
            .unwrap();

        assert_eq!(
            client.products_url().await.unwrap(),
            "https://api.example.com/v1/stores/store-abc/products?batch=true&upsert=true"
        );
    }

    #[tokio::test]
    async fn test_failed_configure_clears_previous_endpoint() {
        let client = HttpProductsClient::new(ClientConfig::default()).unwrap();
        client
            .configure(&remote_config("https://api.example.com"))
            .await
            .unwrap();
        assert!(client.configure(&remote_config("::")).await.is_err());

        let result = client.submit_batch(&[product("A")], 1).await;
        assert!(matches!(result, Err(RemoteSyncError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_submit_batch_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/stores/store-abc/products")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("batch".into(), "true".into()),
                Matcher::UrlEncoded("upsert".into(), "true".into()),
            ]))
            .match_header("x-extend-access-token", "secret")
            .match_body(Matcher::Regex(
                r#"^\[\{"referenceId":"A".*\{"referenceId":"B""#.to_string(),
            ))
            .with_status(201)
            .with_body("[]")
            .create_async()
            .await;

        let client = HttpProductsClient::new(ClientConfig::default()).unwrap();
        client.configure(&remote_config(&server.url())).await.unwrap();
        client
            .submit_batch(&[product("A"), product("B")], 1)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_batch_maps_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/stores/store-abc/products")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"message":"price is required"}"#)
            .create_async()
            .await;

        let client = HttpProductsClient::new(ClientConfig::default()).unwrap();
        client.configure(&remote_config(&server.url())).await.unwrap();
        let err = client.submit_batch(&[product("A")], 3).await.unwrap_err();

        match err {
            RemoteSyncError::Rejected { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert!(body.contains("price is required"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
