//! HTTP client for the ChangeNOW exchange API.

use async_trait::async_trait;
use coinswap_common::{CurrencyRecord, PairKey};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::provider::{decode_catalog, CatalogProvider, ExchangeEstimate, ExchangeGateway};

const API_KEY_HEADER: &str = "x-changenow-api-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinAmountResponse {
    min_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstimateResponse {
    estimated_amount: Option<Decimal>,
    transaction_speed_forecast: Option<String>,
    warning_message: Option<String>,
}

/// Exchange provider client.
#[derive(Debug, Clone)]
pub struct ChangeNowClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChangeNowClient {
    /// Create a new client from gateway configuration.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.exchange_api_url.trim_end_matches('/').to_string(),
            api_key: config.exchange_api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> GatewayResult<T> {
        let url = self.endpoint(path);
        debug!(method = "GET", url = %url, "Exchange API request");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Exchange API returned error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogProvider for ChangeNowClient {
    fn name(&self) -> &str {
        "changenow"
    }

    #[instrument(skip(self))]
    async fn list_currencies(&self) -> GatewayResult<Vec<CurrencyRecord>> {
        let entries: Vec<serde_json::Value> =
            self.get_json("currencies", &[("active", "true")]).await?;
        Ok(decode_catalog(self.name(), entries))
    }
}

#[async_trait]
impl ExchangeGateway for ChangeNowClient {
    #[instrument(skip(self), fields(pair = %pair))]
    async fn min_amount(&self, pair: &PairKey) -> GatewayResult<Decimal> {
        let response: MinAmountResponse = self
            .get_json(&format!("min-amount/{}", pair), &[])
            .await?;

        response
            .min_amount
            .ok_or(GatewayError::MissingField("minAmount"))
    }

    #[instrument(skip(self), fields(pair = %pair, amount = %amount))]
    async fn exchange_estimate(
        &self,
        amount: Decimal,
        pair: &PairKey,
    ) -> GatewayResult<ExchangeEstimate> {
        let response: EstimateResponse = self
            .get_json(&format!("exchange-amount/{}/{}", amount.normalize(), pair), &[])
            .await?;

        let estimate = into_estimate(response)?;
        info!(estimated_amount = %estimate.estimated_amount, "Exchange estimate received");
        Ok(estimate)
    }
}

fn into_estimate(response: EstimateResponse) -> GatewayResult<ExchangeEstimate> {
    Ok(ExchangeEstimate {
        estimated_amount: response
            .estimated_amount
            .ok_or(GatewayError::MissingField("estimatedAmount"))?,
        transaction_speed_forecast: response.transaction_speed_forecast,
        warning_message: response.warning_message,
    })
}
