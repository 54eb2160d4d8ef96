//! Client configuration and protocol constants.
//!
//! The typed-data domain inputs (chain id, exchange contract, collateral
//! token) are fixed configuration, not derived at runtime. Defaults target
//! the production deployment; everything is overridable for testnets.

use std::path::PathBuf;
use std::time::Duration;

use ethers_core::types::Address;

/// Protocol constants for the production deployment.
pub mod protocol {
    /// Production REST API.
    pub const API_ENDPOINT: &str = "https://api.omx.trade";
    /// BNB Smart Chain mainnet chain id.
    pub const CHAIN_ID: u64 = 56;
    /// Exchange contract that verifies order signatures.
    pub const EXCHANGE_ADDRESS: &str = "0x92b3b9d8a67a53eebf9e0e15fdabe9f317b0f162";
    /// Collateral token (USDT on BNB chain).
    pub const COLLATERAL_ADDRESS: &str = "0x55d398326f99059ff775485246999027b3197955";
    /// EIP-712 domain name of the exchange contract.
    pub const DOMAIN_NAME: &str = "OMX Exchange";
    /// EIP-712 domain version.
    pub const DOMAIN_VERSION: &str = "1";
    /// Signature type code for a delegated signer acting for a custody
    /// account.
    pub const SIGNATURE_TYPE_DELEGATED: u8 = 1;
    /// Maker fee rate in basis points.
    pub const FEE_RATE_BPS: u32 = 0;
}

/// Configuration for the order client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API endpoint for submission and queries.
    pub api_endpoint: String,
    /// Chain id used in the typed-data domain.
    pub chain_id: u64,
    /// Exchange contract address (typed-data verifying contract).
    pub exchange_address: Address,
    /// Collateral token address.
    pub collateral_address: Address,
    /// Custody account that economically owns orders. Distinct from the
    /// delegated signer derived from the private key.
    pub maker_address: Address,
    /// Fee rate applied to orders, in basis points.
    pub fee_rate_bps: u32,
    /// Signature type code placed in signed orders.
    pub signature_type: u8,
    /// Path of the metadata cache file.
    pub cache_path: PathBuf,
    /// How long a resolved metadata entry stays fresh.
    pub metadata_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: protocol::API_ENDPOINT.to_string(),
            chain_id: protocol::CHAIN_ID,
            exchange_address: protocol::EXCHANGE_ADDRESS
                .parse()
                .expect("valid exchange address constant"),
            collateral_address: protocol::COLLATERAL_ADDRESS
                .parse()
                .expect("valid collateral address constant"),
            maker_address: Address::zero(),
            fee_rate_bps: protocol::FEE_RATE_BPS,
            signature_type: protocol::SIGNATURE_TYPE_DELEGATED,
            cache_path: PathBuf::from("omx-markets.json"),
            metadata_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ClientConfig {
    /// Production config for a given custody account.
    pub fn for_custody(maker_address: Address) -> Self {
        Self {
            maker_address,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.chain_id, 56);
        assert_eq!(config.metadata_ttl, Duration::from_secs(86_400));
        assert_eq!(config.fee_rate_bps, 0);
        assert_ne!(config.exchange_address, Address::zero());
        assert_ne!(config.collateral_address, Address::zero());
    }

    #[test]
    fn test_for_custody_sets_maker() {
        let maker: Address = "0x00000000000000000000000000000000000000aa"
            .parse()
            .unwrap();
        let config = ClientConfig::for_custody(maker);
        assert_eq!(config.maker_address, maker);
        assert_eq!(config.api_endpoint, protocol::API_ENDPOINT);
    }
}
