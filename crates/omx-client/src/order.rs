//! Order intent and canonical order construction.
//!
//! `OrderAssembler` turns user-level intent (side, human price, share
//! quantity) plus a resolved token id into the canonical order record that
//! gets signed and submitted. Validation happens before anything else:
//! an invalid intent never produces partial state, a salt, or a signature.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ethers_core::types::{Address, U256};
use serde::{Serialize, Serializer};

use omx_common::Side;

use crate::amounts::{normalize_price, order_amounts, to_fixed_18, NormalizedPrice};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// User-level trading intent. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub side: Side,
    /// Human price in [0, 100] with at most one fractional digit.
    pub price: String,
    /// Share quantity, up to 18 fractional digits.
    pub quantity: String,
    /// Expiration as unix seconds; 0 means good-till-cancelled.
    pub expiration: u64,
}

impl OrderIntent {
    pub fn new(side: Side, price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            side,
            price: price.into(),
            quantity: quantity.into(),
            expiration: 0,
        }
    }

    pub fn with_expiration(mut self, expiration: u64) -> Self {
        self.expiration = expiration;
        self
    }
}

/// Time source for salt generation. Injectable so tests can freeze time
/// and still observe distinct salts.
pub trait Clock: Send + Sync {
    /// Nanoseconds since the unix epoch.
    fn unix_nanos(&self) -> u128;
}

/// Wall-clock time source.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_nanos(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos()
    }
}

/// Generates replay-protection salts from the clock plus a process-wide
/// counter, so two orders built in the same nanosecond still get distinct
/// salts.
pub struct SaltGenerator {
    clock: Arc<dyn Clock>,
    counter: AtomicU32,
}

impl SaltGenerator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            counter: AtomicU32::new(0),
        }
    }

    /// Next salt: timestamp in the high bits, sequence in the low 20 bits.
    pub fn next(&self) -> u128 {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        (self.clock.unix_nanos() << 20) | u128::from(seq & 0xF_FFFF)
    }
}

impl Default for SaltGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical order record signed and submitted to the exchange.
///
/// Wire field names and encodings are a compatibility contract: addresses
/// as 0x-prefixed hex, token id as minimal hex, amounts and counters as
/// decimal strings, side as the typed-data uint8.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalOrder {
    /// Time-derived; exceeds u64 range, so it travels as a decimal string.
    #[serde(serialize_with = "ser_u128_str")]
    pub salt: u128,
    /// Custody account that economically owns the order.
    #[serde(serialize_with = "ser_address")]
    pub maker: Address,
    /// Delegated signer authorized to sign for the custody account.
    #[serde(serialize_with = "ser_address")]
    pub signer: Address,
    /// Counterparty restriction; zero address means anyone.
    #[serde(serialize_with = "ser_address")]
    pub taker: Address,
    #[serde(rename = "tokenId", serialize_with = "ser_u256_hex")]
    pub token_id: U256,
    /// 18-decimal fixed point; collateral for BUY, shares for SELL.
    #[serde(rename = "makerAmount", serialize_with = "ser_u256_dec")]
    pub maker_amount: U256,
    /// 18-decimal fixed point; shares for BUY, collateral for SELL.
    #[serde(rename = "takerAmount", serialize_with = "ser_u256_dec")]
    pub taker_amount: U256,
    #[serde(serialize_with = "ser_u64_str")]
    pub expiration: u64,
    #[serde(serialize_with = "ser_u64_str")]
    pub nonce: u64,
    #[serde(rename = "feeRateBps", serialize_with = "ser_u32_str")]
    pub fee_rate_bps: u32,
    #[serde(serialize_with = "ser_side_code")]
    pub side: Side,
    #[serde(rename = "signatureType")]
    pub signature_type: u8,
}

fn ser_address<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:?}"))
}

fn ser_u256_hex<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#x}"))
}

fn ser_u256_dec<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn ser_u64_str<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn ser_u128_str<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn ser_u32_str<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn ser_side_code<S: Serializer>(value: &Side, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(value.protocol_code())
}

/// Builds canonical orders from intents. Pure with respect to its inputs
/// except for the time-derived salt.
pub struct OrderAssembler {
    config: ClientConfig,
    salts: SaltGenerator,
}

impl OrderAssembler {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_salt_source(config, SaltGenerator::new())
    }

    pub fn with_salt_source(config: ClientConfig, salts: SaltGenerator) -> Self {
        Self { config, salts }
    }

    /// Validates an intent without building anything: price shape and
    /// range, quantity precision, and strictly positive derived amounts.
    pub fn validate(&self, intent: &OrderIntent) -> Result<(NormalizedPrice, U256), ClientError> {
        let price = normalize_price(&intent.price)?;
        let shares = to_fixed_18(&intent.quantity)?;
        if shares.is_zero() {
            return Err(ClientError::InvalidIntent(
                "quantity must be strictly positive".to_string(),
            ));
        }
        let (maker_amount, taker_amount) = order_amounts(intent.side, shares, price);
        if maker_amount.is_zero() || taker_amount.is_zero() {
            return Err(ClientError::InvalidIntent(format!(
                "order amounts must be strictly positive (price {} × quantity {})",
                intent.price, intent.quantity
            )));
        }
        Ok((price, shares))
    }

    /// Builds the canonical order for an already-resolved token id.
    pub fn build(
        &self,
        intent: &OrderIntent,
        token_id: U256,
        signer: Address,
    ) -> Result<CanonicalOrder, ClientError> {
        let (price, shares) = self.validate(intent)?;
        let (maker_amount, taker_amount) = order_amounts(intent.side, shares, price);

        Ok(CanonicalOrder {
            salt: self.salts.next(),
            maker: self.config.maker_address,
            signer,
            taker: Address::zero(),
            token_id,
            maker_amount,
            taker_amount,
            expiration: intent.expiration,
            nonce: 0,
            fee_rate_bps: self.config.fee_rate_bps,
            side: intent.side,
            signature_type: self.config.signature_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FrozenClock;

    impl Clock for FrozenClock {
        fn unix_nanos(&self) -> u128 {
            1_700_000_000_000_000_000
        }
    }

    fn test_config() -> ClientConfig {
        ClientConfig::for_custody(
            "0x00000000000000000000000000000000000000aa"
                .parse()
                .unwrap(),
        )
    }

    fn test_signer() -> Address {
        "0x00000000000000000000000000000000000000bb"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_salts_distinct_at_same_instant() {
        let salts = SaltGenerator::with_clock(Arc::new(FrozenClock));
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(salts.next()), "salt collision");
        }
    }

    #[test]
    fn test_build_buy_amounts() {
        let assembler = OrderAssembler::new(test_config());
        let intent = OrderIntent::new(Side::Buy, "99.1", "10");
        let order = assembler.build(&intent, U256::from(0xabc), test_signer()).unwrap();

        assert_eq!(order.taker_amount, U256::exp10(19));
        assert_eq!(order.maker_amount, U256::from(9910u64) * U256::exp10(15));
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.taker, Address::zero());
        assert_eq!(order.maker, test_config().maker_address);
        assert_eq!(order.signer, test_signer());
        assert_eq!(order.nonce, 0);
        assert_eq!(order.signature_type, 1);
    }

    #[test]
    fn test_build_sell_inverts_legs() {
        let assembler = OrderAssembler::new(test_config());
        let buy = assembler
            .build(&OrderIntent::new(Side::Buy, "40", "5"), U256::one(), test_signer())
            .unwrap();
        let sell = assembler
            .build(&OrderIntent::new(Side::Sell, "40", "5"), U256::one(), test_signer())
            .unwrap();

        assert_eq!(buy.taker_amount, sell.maker_amount);
        assert_eq!(buy.maker_amount, sell.taker_amount);
    }

    #[test]
    fn test_consecutive_builds_get_distinct_salts() {
        let assembler = OrderAssembler::with_salt_source(
            test_config(),
            SaltGenerator::with_clock(Arc::new(FrozenClock)),
        );
        let intent = OrderIntent::new(Side::Buy, "50", "1");
        let first = assembler.build(&intent, U256::one(), test_signer()).unwrap();
        let second = assembler.build(&intent, U256::one(), test_signer()).unwrap();
        assert_ne!(first.salt, second.salt);
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let assembler = OrderAssembler::new(test_config());
        let intent = OrderIntent::new(Side::Buy, "50", "0");
        assert!(matches!(
            assembler.build(&intent, U256::one(), test_signer()),
            Err(ClientError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_rejects_zero_value_order() {
        let assembler = OrderAssembler::new(test_config());
        // price 0 makes the collateral leg zero
        let intent = OrderIntent::new(Side::Buy, "0", "10");
        assert!(matches!(
            assembler.build(&intent, U256::one(), test_signer()),
            Err(ClientError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_rejects_over_precise_price() {
        let assembler = OrderAssembler::new(test_config());
        let intent = OrderIntent::new(Side::Buy, "100.25", "10");
        assert!(matches!(
            assembler.build(&intent, U256::one(), test_signer()),
            Err(ClientError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_wire_serialization_pins_field_names() {
        let assembler = OrderAssembler::new(test_config());
        let intent = OrderIntent::new(Side::Buy, "99.1", "10");
        let order = assembler.build(&intent, U256::from(0xabc), test_signer()).unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["salt"], order.salt.to_string().as_str());
        assert_eq!(json["tokenId"], "0xabc");
        assert_eq!(json["makerAmount"], "9910000000000000000");
        assert_eq!(json["takerAmount"], "10000000000000000000");
        assert_eq!(json["side"], 0);
        assert_eq!(json["signatureType"], 1);
        assert_eq!(json["feeRateBps"], "0");
        assert_eq!(json["expiration"], "0");
        assert_eq!(json["nonce"], "0");
        assert_eq!(
            json["maker"],
            "0x00000000000000000000000000000000000000aa"
        );
        assert_eq!(
            json["signer"],
            "0x00000000000000000000000000000000000000bb"
        );
    }

    #[test]
    fn test_wall_clock_salt_serializes_as_string() {
        // real nanosecond timestamps shift past u64 range; the wire form
        // must stay a decimal string, not a JSON number
        let assembler = OrderAssembler::new(test_config());
        let intent = OrderIntent::new(Side::Buy, "50", "1");
        let order = assembler.build(&intent, U256::one(), test_signer()).unwrap();

        assert!(order.salt > u128::from(u64::MAX));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["salt"], order.salt.to_string().as_str());
    }
}
