//! Exact fixed-point conversion between human decimal input and on-chain
//! integer amounts.
//!
//! All conversions run on integers (decimal mantissa and `U256`), never on
//! floats: monetary amounts must be exact. Human prices live in [0, 100]
//! with at most one fractional digit; the normalized on-chain price is a
//! per-mille integer over a denominator of 1000 (three implied decimals in
//! [0, 1]). Share and collateral amounts are 18-decimal fixed point.

use ethers_core::types::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use omx_common::Side;

use crate::error::ClientError;

/// Number of fixed-point decimals for on-chain amounts.
pub const FIXED_POINT_DECIMALS: u32 = 18;

/// Denominator of the normalized price (three implied decimals).
pub const PRICE_DENOMINATOR: u64 = 1000;

/// A market price normalized to [0, 1] with exactly three fractional
/// digits, stored as an exact per-mille integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPrice(u16);

impl NormalizedPrice {
    /// Numerator over [`PRICE_DENOMINATOR`].
    pub fn permille(&self) -> u64 {
        u64::from(self.0)
    }

    /// The 0–1 three-decimal wire form, e.g. `991` renders as `"0.991"`.
    pub fn to_decimal_string(&self) -> String {
        if self.0 == 1000 {
            "1.000".to_string()
        } else {
            format!("0.{:03}", self.0)
        }
    }

    /// The human 0–100 form this price was normalized from.
    pub fn to_percent(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 1).normalize()
    }
}

/// Converts a human price string in [0, 100] with at most one fractional
/// digit into its normalized form. Pure integer scaling on the decimal
/// mantissa; anything over-precise or out of range is rejected.
pub fn normalize_price(price: &str) -> Result<NormalizedPrice, ClientError> {
    let trimmed = price.trim();

    if let Some((_, frac)) = trimmed.split_once('.') {
        if frac.len() > 1 {
            return Err(ClientError::InvalidPrice(format!(
                "price {price} has more than one fractional digit"
            )));
        }
    }

    let value: Decimal = trimmed
        .parse()
        .map_err(|_| ClientError::InvalidPrice(format!("not a decimal: {price:?}")))?;

    if value.is_sign_negative() || value > Decimal::from(100) {
        return Err(ClientError::InvalidPrice(format!(
            "price {price} outside [0, 100]"
        )));
    }

    let permille = (value * Decimal::TEN)
        .to_u16()
        .ok_or_else(|| ClientError::InvalidPrice(format!("price {price} not representable")))?;

    Ok(NormalizedPrice(permille))
}

/// Converts a decimal string into an 18-decimal fixed-point integer by
/// scaling the mantissa with a power of ten. Exact for every input with at
/// most 18 fractional digits; anything beyond that is `PrecisionOverflow`.
pub fn to_fixed_18(value: &str) -> Result<U256, ClientError> {
    let trimmed = value.trim();

    if let Some((_, frac)) = trimmed.split_once('.') {
        if frac.len() > FIXED_POINT_DECIMALS as usize {
            return Err(ClientError::PrecisionOverflow(format!(
                "{value} exceeds {FIXED_POINT_DECIMALS} fractional digits"
            )));
        }
    }

    let parsed: Decimal = trimmed
        .parse()
        .map_err(|_| ClientError::InvalidIntent(format!("not a decimal: {value:?}")))?;

    if parsed.is_sign_negative() {
        return Err(ClientError::InvalidIntent(format!(
            "negative amount: {value}"
        )));
    }

    // scale() is bounded by the fractional-digit check above.
    let mantissa = parsed.mantissa().unsigned_abs();
    let rescale = FIXED_POINT_DECIMALS - parsed.scale();
    Ok(U256::from(mantissa) * U256::exp10(rescale as usize))
}

/// Derives the maker/taker legs of an order.
///
/// For BUY the maker leg is collateral and the taker leg is shares; SELL
/// inverts the roles. The collateral leg is `shares × permille / 1000` in
/// integer division, which truncates (rounds down). Truncation is the
/// contract: it can only ever under-spend, never over-spend.
pub fn order_amounts(side: Side, shares: U256, price: NormalizedPrice) -> (U256, U256) {
    let collateral = shares * U256::from(price.permille()) / U256::from(PRICE_DENOMINATOR);
    match side {
        Side::Buy => (collateral, shares),
        Side::Sell => (shares, collateral),
    }
}

/// Parses a token identifier in either `0x`-prefixed hex or decimal form.
pub fn parse_token_id(token_id: &str) -> Result<U256, ClientError> {
    let trimmed = token_id.trim();
    let invalid = || ClientError::InvalidIntent(format!("invalid token id: {token_id:?}"));
    if let Some(hex_digits) = trimmed.strip_prefix("0x") {
        U256::from_str_radix(hex_digits, 16).map_err(|_| invalid())
    } else {
        U256::from_dec_str(trimmed).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_price_exact() {
        assert_eq!(normalize_price("99.1").unwrap().permille(), 991);
        assert_eq!(normalize_price("0.5").unwrap().permille(), 5);
        assert_eq!(normalize_price("50").unwrap().permille(), 500);
        assert_eq!(normalize_price("100").unwrap().permille(), 1000);
        assert_eq!(normalize_price("0").unwrap().permille(), 0);
    }

    #[test]
    fn test_normalize_price_round_trips() {
        for raw in ["0", "0.1", "0.5", "1", "12.3", "50", "99.1", "99.9", "100"] {
            let normalized = normalize_price(raw).unwrap();
            let expected: Decimal = raw.parse::<Decimal>().unwrap().normalize();
            assert_eq!(normalized.to_percent(), expected, "round trip for {raw}");
        }
    }

    #[test]
    fn test_normalize_price_rejects_over_precision() {
        assert!(matches!(
            normalize_price("100.25"),
            Err(ClientError::InvalidPrice(_))
        ));
        assert!(matches!(
            normalize_price("0.55"),
            Err(ClientError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_normalize_price_rejects_out_of_range() {
        assert!(matches!(
            normalize_price("100.1"),
            Err(ClientError::InvalidPrice(_))
        ));
        assert!(matches!(
            normalize_price("-1"),
            Err(ClientError::InvalidPrice(_))
        ));
        assert!(matches!(
            normalize_price("abc"),
            Err(ClientError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_price_decimal_string() {
        assert_eq!(normalize_price("99.1").unwrap().to_decimal_string(), "0.991");
        assert_eq!(normalize_price("0.5").unwrap().to_decimal_string(), "0.005");
        assert_eq!(normalize_price("100").unwrap().to_decimal_string(), "1.000");
        assert_eq!(normalize_price("0").unwrap().to_decimal_string(), "0.000");
    }

    #[test]
    fn test_to_fixed_18_exact() {
        assert_eq!(to_fixed_18("10").unwrap(), U256::exp10(19));
        assert_eq!(to_fixed_18("1.5").unwrap(), U256::from(15) * U256::exp10(17));
        assert_eq!(to_fixed_18("0.000000000000000001").unwrap(), U256::one());
        assert_eq!(to_fixed_18("0").unwrap(), U256::zero());
    }

    #[test]
    fn test_to_fixed_18_rejects_excess_precision() {
        // 19 fractional digits
        assert!(matches!(
            to_fixed_18("0.0000000000000000001"),
            Err(ClientError::PrecisionOverflow(_))
        ));
        // trailing zeros past the scale are still over-precise input
        assert!(matches!(
            to_fixed_18("1.0000000000000000000"),
            Err(ClientError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn test_to_fixed_18_rejects_garbage() {
        assert!(matches!(
            to_fixed_18("ten"),
            Err(ClientError::InvalidIntent(_))
        ));
        assert!(matches!(
            to_fixed_18("-5"),
            Err(ClientError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_order_amounts_buy() {
        let shares = to_fixed_18("10").unwrap();
        let price = normalize_price("99.1").unwrap();
        let (maker, taker) = order_amounts(Side::Buy, shares, price);

        // 10 × 0.991 × 10^18
        assert_eq!(maker, U256::from(9910u64) * U256::exp10(15));
        assert_eq!(taker, shares);
    }

    #[test]
    fn test_buy_sell_legs_are_consistent() {
        let shares = to_fixed_18("7.25").unwrap();
        let price = normalize_price("33.3").unwrap();

        let (buy_maker, buy_taker) = order_amounts(Side::Buy, shares, price);
        let (sell_maker, sell_taker) = order_amounts(Side::Sell, shares, price);

        assert_eq!(buy_taker, sell_maker);
        assert_eq!(buy_maker, sell_taker);
    }

    #[test]
    fn test_collateral_division_truncates() {
        // 1 wei of shares at 0.991 would be 0.991 wei of collateral;
        // integer division rounds that down to zero.
        let shares = U256::one();
        let price = normalize_price("99.1").unwrap();
        let (maker, _) = order_amounts(Side::Buy, shares, price);
        assert_eq!(maker, U256::zero());
    }

    #[test]
    fn test_parse_token_id() {
        assert_eq!(parse_token_id("0xabc").unwrap(), U256::from(0xabc));
        assert_eq!(parse_token_id("2748").unwrap(), U256::from(2748));
        assert!(parse_token_id("zz").is_err());
    }

    #[test]
    fn test_percent_uses_decimal_not_float() {
        // dec! keeps the comparison exact; 99.1 is not representable in f64
        assert_eq!(normalize_price("99.1").unwrap().to_percent(), dec!(99.1));
    }
}
