//! HTTP client for the content catalog API.

use async_trait::async_trait;
use coinswap_common::CurrencyRecord;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::provider::{decode_catalog, CatalogProvider};

/// Query sent with every catalog request: English locale, no paging, site-listed only.
const CATALOG_QUERY: [(&str, &str); 3] = [("_locale", "en"), ("_limit", "-1"), ("_is_site", "true")];

/// Content catalog client.
#[derive(Debug, Clone)]
pub struct ContentApiClient {
    client: Client,
    base_url: String,
}

impl ContentApiClient {
    /// Create a new client from gateway configuration.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.content_api_url.trim_end_matches('/').to_string(),
        })
    }

    fn currencies_url(&self) -> String {
        format!("{}/currencies", self.base_url)
    }
}

#[async_trait]
impl CatalogProvider for ContentApiClient {
    fn name(&self) -> &str {
        "content-api"
    }

    #[instrument(skip(self))]
    async fn list_currencies(&self) -> GatewayResult<Vec<CurrencyRecord>> {
        let url = self.currencies_url();
        debug!(method = "GET", url = %url, "Content API request");

        let response = self.client.get(&url).query(&CATALOG_QUERY[..]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Content API returned error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let entries: Vec<serde_json::Value> = response.json().await?;
        Ok(decode_catalog(self.name(), entries))
    }
}
