//! High-level order placement and query facade.
//!
//! Wires the assembler, signature engine, metadata cache, and transport
//! collaborators together. Every placement flow validates the intent
//! before touching the network, so a malformed price or quantity never
//! costs a metadata fetch or a submission attempt.

use std::sync::Arc;

use async_trait::async_trait;
use ethers_core::types::U256;
use tracing::info;

use omx_common::{Outcome, QueryType};

use crate::amounts::{parse_token_id, NormalizedPrice};
use crate::api::{
    OrderPage, OrderQueryRequest, OrderQueryResponse, SubmitOrderRequest, SubmitOrderResponse,
};
use crate::cache::{MetadataCache, MetadataFetcher};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::order::{OrderAssembler, OrderIntent};
use crate::signing::{SignatureEngine, SignedOrder, SignerCredential};

/// Sends signed orders to the exchange.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(
        &self,
        request: &SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, ClientError>;
}

/// Lists orders from the exchange.
#[async_trait]
pub trait OrderQuery: Send + Sync {
    async fn query(&self, request: &OrderQueryRequest) -> Result<OrderQueryResponse, ClientError>;
}

/// Result of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: String,
    pub order: SignedOrder,
}

/// Client facade over order construction, signing, and transport.
pub struct OrderClient {
    config: ClientConfig,
    assembler: OrderAssembler,
    engine: SignatureEngine,
    credential: SignerCredential,
    cache: MetadataCache,
    submitter: Arc<dyn OrderSubmitter>,
    query: Arc<dyn OrderQuery>,
}

impl OrderClient {
    pub async fn new(
        config: ClientConfig,
        credential: SignerCredential,
        fetcher: Arc<dyn MetadataFetcher>,
        submitter: Arc<dyn OrderSubmitter>,
        query: Arc<dyn OrderQuery>,
    ) -> Self {
        let cache =
            MetadataCache::open(config.cache_path.clone(), config.metadata_ttl, fetcher).await;
        let engine = SignatureEngine::new(&config);
        let assembler = OrderAssembler::new(config.clone());
        Self {
            config,
            assembler,
            engine,
            credential,
            cache,
            submitter,
            query,
        }
    }

    /// Places an order for an already-known token id (hex or decimal).
    pub async fn place_order(
        &self,
        intent: &OrderIntent,
        token_id: &str,
    ) -> Result<PlacedOrder, ClientError> {
        let (price, _) = self.assembler.validate(intent)?;
        let token_id = parse_token_id(token_id)?;
        self.submit_order(intent, token_id, price).await
    }

    /// Places an order against one outcome of a market, resolving the
    /// token id through the metadata cache. The intent and the outcome
    /// selector are validated before any metadata fetch.
    pub async fn place_order_for_market(
        &self,
        market_id: u64,
        outcome: &str,
        intent: &OrderIntent,
    ) -> Result<PlacedOrder, ClientError> {
        let outcome = parse_outcome(outcome)?;
        let (price, _) = self.assembler.validate(intent)?;

        let info = self.cache.resolve(market_id, false).await?;
        let token_id = parse_token_id(info.token_for(outcome))?;
        self.submit_order(intent, token_id, price).await
    }

    async fn submit_order(
        &self,
        intent: &OrderIntent,
        token_id: U256,
        price: NormalizedPrice,
    ) -> Result<PlacedOrder, ClientError> {
        let order = self
            .assembler
            .build(intent, token_id, self.credential.address())?;
        let signed = self.engine.sign(order, &self.credential)?;

        let request = SubmitOrderRequest {
            order: signed.order.clone(),
            signature: signed.signature.clone(),
            price: price.to_decimal_string(),
        };

        info!(
            side = %intent.side,
            price = %request.price,
            quantity = %intent.quantity,
            "submitting order"
        );
        let response = self.submitter.submit(&request).await?;
        info!(order_id = %response.order_id, "order accepted");

        Ok(PlacedOrder {
            order_id: response.order_id,
            order: signed,
        })
    }

    /// Open orders for the custody account.
    pub async fn open_orders(
        &self,
        page: u32,
        limit: u32,
        topic_id: Option<u64>,
    ) -> Result<OrderPage, ClientError> {
        self.query_orders(QueryType::Open, page, limit, topic_id)
            .await
    }

    /// Filled and cancelled orders for the custody account.
    pub async fn closed_orders(
        &self,
        page: u32,
        limit: u32,
        topic_id: Option<u64>,
    ) -> Result<OrderPage, ClientError> {
        self.query_orders(QueryType::Closed, page, limit, topic_id)
            .await
    }

    pub async fn query_orders(
        &self,
        query_type: QueryType,
        page: u32,
        limit: u32,
        topic_id: Option<u64>,
    ) -> Result<OrderPage, ClientError> {
        let request = OrderQueryRequest {
            page,
            limit,
            wallet_address: format!("{:?}", self.config.maker_address),
            query_type,
            topic_id,
        };
        let response = self.query.query(&request).await?;
        Ok(response.result)
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Maps a raw outcome selector to an [`Outcome`], case-insensitively.
fn parse_outcome(selector: &str) -> Result<Outcome, ClientError> {
    match selector.trim().to_ascii_uppercase().as_str() {
        "YES" => Ok(Outcome::Yes),
        "NO" => Ok(Outcome::No),
        other => Err(ClientError::UnknownOutcome(format!(
            "expected YES or NO, got {other:?}"
        ))),
    }
}
