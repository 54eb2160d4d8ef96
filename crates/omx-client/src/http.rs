//! HTTP transport for the exchange REST API.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use serde::Deserialize;

use crate::api::{
    OrderQueryRequest, OrderQueryResponse, SubmitOrderRequest, SubmitOrderResponse,
};
use crate::cache::{MetadataFetcher, TokenPair};
use crate::client::{OrderQuery, OrderSubmitter};
use crate::config::ClientConfig;
use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reqwest-backed implementation of the submission and query
/// collaborators.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, ClientError>
    where
        Req: serde::Serialize + ?Sized,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "posting request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "{url} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("invalid response from {url}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct MarketTokensResponse {
    #[serde(rename = "yesTokenId")]
    yes_token_id: String,
    #[serde(rename = "noTokenId")]
    no_token_id: String,
}

#[async_trait]
impl MetadataFetcher for HttpGateway {
    async fn fetch(&self, market_id: u64) -> Result<TokenPair, ClientError> {
        let url = format!("{}/market/{market_id}/tokens", self.base_url);
        debug!(%url, "fetching market metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::MetadataUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::MetadataUnavailable(format!(
                "{url} returned {status}"
            )));
        }

        let tokens: MarketTokensResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MetadataUnavailable(format!("invalid response: {e}")))?;

        Ok(TokenPair {
            yes_token_id: tokens.yes_token_id,
            no_token_id: tokens.no_token_id,
        })
    }
}

#[async_trait]
impl OrderSubmitter for HttpGateway {
    async fn submit(
        &self,
        request: &SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, ClientError> {
        self.post_json("/order/create", request).await
    }
}

#[async_trait]
impl OrderQuery for HttpGateway {
    async fn query(&self, request: &OrderQueryRequest) -> Result<OrderQueryResponse, ClientError> {
        self.post_json("/order/list", request).await
    }
}
