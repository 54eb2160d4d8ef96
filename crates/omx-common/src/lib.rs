//! Shared types for the OMX prediction-market client.
//!
//! This crate contains the small enum vocabulary used across the order
//! engine and the wire layer: order side, binary outcome, order status
//! and history query type.

pub mod types;

pub use types::{Outcome, OrderStatus, QueryType, Side};
