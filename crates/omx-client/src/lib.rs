//! Client-side order construction and signing for a binary-outcome
//! limit-order exchange.
//!
//! The crate turns a user intent (side, human-readable price and
//! quantity) into a canonically-encoded, typed-data-signed order and
//! hands it to a submission collaborator. Market metadata (outcome token
//! ids) is resolved through a persistent TTL cache. All monetary
//! arithmetic is exact integer arithmetic; no floating point touches an
//! amount at any step.

pub mod amounts;
pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod order;
pub mod signing;

pub use amounts::{normalize_price, order_amounts, parse_token_id, to_fixed_18, NormalizedPrice};
pub use api::{
    OrderPage, OrderQueryRequest, OrderQueryResponse, OrderRecord, SubmitOrderRequest,
    SubmitOrderResponse,
};
pub use cache::{MarketInfo, MetadataCache, MetadataFetcher, TokenPair};
pub use client::{OrderClient, OrderQuery, OrderSubmitter, PlacedOrder};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpGateway;
pub use order::{CanonicalOrder, OrderAssembler, OrderIntent, SaltGenerator};
pub use signing::{SignatureEngine, SignedOrder, SignerCredential};
