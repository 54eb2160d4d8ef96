//! Core enum types shared by the order engine and the wire layer.
//!
//! The exchange uses two different integer encodings: the signed order
//! carries side as 0/1 (the typed-data uint8), while the history API
//! reports side and outcome as 1/2. Both encodings live here so no call
//! site hand-rolls the mapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order side for trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Side encoding used in the signed order struct (typed-data uint8).
    pub fn protocol_code(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Side encoding used by the order-history API (1 = BUY, 2 = SELL).
    pub fn query_code(&self) -> u8 {
        match self {
            Side::Buy => 1,
            Side::Sell => 2,
        }
    }

    pub fn from_query_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Side::Buy),
            2 => Some(Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Outcome selector for binary markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub fn opposite(&self) -> Self {
        match self {
            Outcome::Yes => Outcome::No,
            Outcome::No => Outcome::Yes,
        }
    }

    /// Outcome encoding used by the order-history API (1 = YES, 2 = NO).
    pub fn side_code(&self) -> u8 {
        match self {
            Outcome::Yes => 1,
            Outcome::No => 2,
        }
    }

    pub fn from_side_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Outcome::Yes),
            2 => Some(Outcome::No),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Yes => write!(f, "YES"),
            Outcome::No => write!(f, "NO"),
        }
    }
}

/// Error raised when a wire integer does not map to a known enum value.
#[derive(Debug, Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: u8,
}

/// Order status as reported by the exchange (1 = OPEN, 2 = FILLED,
/// 3 = CANCELLED). The integer values are a compatibility contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl From<OrderStatus> for u8 {
    fn from(status: OrderStatus) -> u8 {
        match status {
            OrderStatus::Open => 1,
            OrderStatus::Filled => 2,
            OrderStatus::Cancelled => 3,
        }
    }
}

impl TryFrom<u8> for OrderStatus {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OrderStatus::Open),
            2 => Ok(OrderStatus::Filled),
            3 => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownCode { kind: "order status", code }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// History query type (1 = open orders, 2 = closed orders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QueryType {
    Open,
    Closed,
}

impl From<QueryType> for u8 {
    fn from(ty: QueryType) -> u8 {
        match ty {
            QueryType::Open => 1,
            QueryType::Closed => 2,
        }
    }
}

impl TryFrom<u8> for QueryType {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(QueryType::Open),
            2 => Ok(QueryType::Closed),
            _ => Err(UnknownCode { kind: "query type", code }),
        }
    }
}
