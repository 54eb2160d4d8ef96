//! Wire types for the exchange HTTP API.
//!
//! Field names and enum values here are a compatibility contract with the
//! counterparty system; they must match the wire byte-for-byte. Tests pin
//! the serialized shape so an accidental rename fails loudly.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use omx_common::{Outcome, OrderStatus, QueryType, Side};

use crate::order::CanonicalOrder;

/// Payload for placing a signed order.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOrderRequest {
    pub order: CanonicalOrder,
    /// Signature envelope: `0x` + signer address + 65-byte signature.
    pub signature: String,
    /// Normalized price in the 0-1 three-decimal form, e.g. "0.991".
    pub price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: String,
}

/// Paged order listing request.
#[derive(Debug, Clone, Serialize)]
pub struct OrderQueryRequest {
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    #[serde(rename = "queryType")]
    pub query_type: QueryType,
    /// Restricts the listing to one market when present.
    #[serde(rename = "topicId", skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderQueryResponse {
    pub result: OrderPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderPage {
    pub list: Vec<OrderRecord>,
    pub total: u64,
}

/// One order as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "topicId")]
    pub topic_id: u64,
    #[serde(rename = "topicTitle")]
    pub topic_title: String,
    pub outcome: Outcome,
    #[serde(rename = "outcomeSide")]
    pub outcome_side: u8,
    /// Decimal price string in the 0-1 form.
    pub price: String,
    /// Fixed-point share amount string.
    pub amount: String,
    /// Progress as a "filled/total" string, e.g. "3/10".
    pub filled: String,
    pub status: OrderStatus,
    #[serde(
        serialize_with = "ser_side_query_code",
        deserialize_with = "de_side_query_code"
    )]
    pub side: Side,
    #[serde(rename = "totalPrice")]
    pub total_price: String,
    /// Unix seconds.
    #[serde(rename = "createdAt")]
    pub created_at: u64,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "currencyAddress")]
    pub currency_address: String,
    #[serde(rename = "transNo")]
    pub trans_no: String,
}

impl OrderRecord {
    /// Fill progress as a ratio in `[0, 1]`, parsed from the
    /// "filled/total" string. `None` when the string is malformed or the
    /// total is zero.
    pub fn fill_fraction(&self) -> Option<Decimal> {
        let (filled, total) = self.filled.split_once('/')?;
        let filled: Decimal = filled.trim().parse().ok()?;
        let total: Decimal = total.trim().parse().ok()?;
        if total.is_zero() {
            return None;
        }
        filled.checked_div(total)
    }
}

fn ser_side_query_code<S: Serializer>(side: &Side, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(side.query_code())
}

fn de_side_query_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Side, D::Error> {
    let code = u8::deserialize(deserializer)?;
    Side::from_query_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown side code {code}")))
}
