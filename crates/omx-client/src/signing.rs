//! Typed-data digest construction and delegated-signer signatures.
//!
//! The exchange verifies orders against an EIP-712 style domain (name,
//! version, chain id, exchange contract). The digest is deterministic:
//! signing the same canonical order twice yields identical digest bytes,
//! and because ECDSA here uses RFC-6979 deterministic nonces, identical
//! signature bytes as well.
//!
//! ## Security
//!
//! The private key never leaves `SignerCredential`; it is not logged,
//! persisted, or included in `Debug` output.

use ethers_core::types::{Address, H256};
use sha3::{Digest, Keccak256};

use crate::config::{protocol, ClientConfig};
use crate::error::ClientError;
use crate::order::CanonicalOrder;

/// Length of the packed signature envelope in bytes: 20-byte signer
/// address followed by the raw 65-byte r‖s‖v signature.
pub const ENVELOPE_LEN: usize = 20 + 65;

/// A delegated signer's credential: the signing key and the address
/// derived from it.
#[derive(Clone)]
pub struct SignerCredential {
    signing_key: ethers_core::k256::ecdsa::SigningKey,
    address: Address,
}

impl std::fmt::Debug for SignerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerCredential")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

impl SignerCredential {
    /// Parses a 32-byte private key from hex (with or without 0x prefix)
    /// and derives the signer address.
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, ClientError> {
        let key_str = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);

        let key_bytes = hex::decode(key_str)
            .map_err(|e| ClientError::SigningFailure(format!("invalid private key hex: {e}")))?;

        if key_bytes.len() != 32 {
            return Err(ClientError::SigningFailure(format!(
                "private key must be 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let signing_key = ethers_core::k256::ecdsa::SigningKey::from_slice(&key_bytes)
            .map_err(|e| ClientError::SigningFailure(format!("invalid private key: {e}")))?;

        let address = derive_address(&signing_key);

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The delegated signer address.
    pub fn address(&self) -> Address {
        self.address
    }
}

/// Derive the Ethereum-style address: last 20 bytes of the keccak256 of
/// the uncompressed public key (without the 0x04 prefix byte).
fn derive_address(signing_key: &ethers_core::k256::ecdsa::SigningKey) -> Address {
    use ethers_core::k256::elliptic_curve::sec1::ToEncodedPoint;
    use ethers_core::k256::PublicKey;

    let public_key = PublicKey::from(signing_key.verifying_key());
    let public_key_point = public_key.to_encoded_point(false);
    let public_key_bytes = public_key_point.as_bytes();

    let mut hasher = Keccak256::new();
    hasher.update(&public_key_bytes[1..]);
    let hash = hasher.finalize();

    Address::from_slice(&hash[12..32])
}

/// A canonical order plus its packed signature envelope. Produced once
/// per submission attempt; never mutated, never cached.
#[derive(Debug, Clone)]
pub struct SignedOrder {
    pub order: CanonicalOrder,
    /// `0x` + signer address (40 hex) + 65-byte signature (130 hex).
    pub signature: String,
}

/// Computes typed-data digests and delegated-signer signatures over
/// canonical orders.
pub struct SignatureEngine {
    domain_separator: H256,
    order_type_hash: H256,
}

impl SignatureEngine {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            domain_separator: compute_domain_separator(config.chain_id, config.exchange_address),
            order_type_hash: compute_order_type_hash(),
        }
    }

    /// The typed-data signing digest for an order:
    /// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
    pub fn digest(&self, order: &CanonicalOrder) -> H256 {
        let struct_hash = self.struct_hash(order);

        let mut hasher = Keccak256::new();
        hasher.update([0x19, 0x01]);
        hasher.update(self.domain_separator.as_bytes());
        hasher.update(struct_hash.as_bytes());
        H256::from_slice(&hasher.finalize())
    }

    /// Signs an order and packs the custody envelope.
    ///
    /// The order's signer field must match the credential's address; a
    /// mismatch would produce a signature the exchange rejects, so it is
    /// surfaced here instead.
    pub fn sign(
        &self,
        order: CanonicalOrder,
        credential: &SignerCredential,
    ) -> Result<SignedOrder, ClientError> {
        if order.signer != credential.address {
            return Err(ClientError::SigningFailure(format!(
                "order signer {:?} does not match credential {:?}",
                order.signer, credential.address
            )));
        }

        let digest = self.digest(&order);

        use ethers_core::k256::ecdsa::signature::hazmat::PrehashSigner;
        let (sig, recovery_id): (ethers_core::k256::ecdsa::Signature, _) = credential
            .signing_key
            .sign_prehash(digest.as_bytes())
            .map_err(|e| ClientError::SigningFailure(format!("ecdsa signing failed: {e}")))?;

        let mut envelope = [0u8; ENVELOPE_LEN];
        envelope[..20].copy_from_slice(credential.address.as_bytes());
        envelope[20..52].copy_from_slice(&sig.r().to_bytes());
        envelope[52..84].copy_from_slice(&sig.s().to_bytes());
        envelope[84] = recovery_id.to_byte() + 27;

        Ok(SignedOrder {
            order,
            signature: format!("0x{}", hex::encode(envelope)),
        })
    }

    /// ABI-encode and hash the order struct per the pinned field schema.
    fn struct_hash(&self, order: &CanonicalOrder) -> H256 {
        let mut encoded = Vec::with_capacity(13 * 32);
        encoded.extend_from_slice(self.order_type_hash.as_bytes());

        let mut word = [0u8; 32];
        word[16..].copy_from_slice(&order.salt.to_be_bytes());
        encoded.extend_from_slice(&word);

        encoded.extend_from_slice(&address_word(order.maker));
        encoded.extend_from_slice(&address_word(order.signer));
        encoded.extend_from_slice(&address_word(order.taker));

        let mut word = [0u8; 32];
        order.token_id.to_big_endian(&mut word);
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        order.maker_amount.to_big_endian(&mut word);
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        order.taker_amount.to_big_endian(&mut word);
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&order.expiration.to_be_bytes());
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&order.nonce.to_be_bytes());
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[28..].copy_from_slice(&order.fee_rate_bps.to_be_bytes());
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[31] = order.side.protocol_code();
        encoded.extend_from_slice(&word);

        let mut word = [0u8; 32];
        word[31] = order.signature_type;
        encoded.extend_from_slice(&word);

        let mut hasher = Keccak256::new();
        hasher.update(&encoded);
        H256::from_slice(&hasher.finalize())
    }
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Domain separator over (name, version, chainId, verifyingContract).
fn compute_domain_separator(chain_id: u64, exchange: Address) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(
        b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
    );
    let domain_type_hash = hasher.finalize();

    let mut hasher = Keccak256::new();
    hasher.update(protocol::DOMAIN_NAME.as_bytes());
    let name_hash = hasher.finalize();

    let mut hasher = Keccak256::new();
    hasher.update(protocol::DOMAIN_VERSION.as_bytes());
    let version_hash = hasher.finalize();

    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&domain_type_hash);
    encoded.extend_from_slice(&name_hash);
    encoded.extend_from_slice(&version_hash);
    encoded.extend_from_slice(&[0u8; 24]);
    encoded.extend_from_slice(&chain_id.to_be_bytes());
    encoded.extend_from_slice(&address_word(exchange));

    let mut hasher = Keccak256::new();
    hasher.update(&encoded);
    H256::from_slice(&hasher.finalize())
}

fn compute_order_type_hash() -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(
        b"Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)",
    );
    H256::from_slice(&hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::U256;
    use omx_common::Side;

    // Well-known test key; never use outside tests.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_order(credential: &SignerCredential) -> CanonicalOrder {
        CanonicalOrder {
            salt: 42,
            maker: "0x00000000000000000000000000000000000000aa"
                .parse()
                .unwrap(),
            signer: credential.address(),
            taker: Address::zero(),
            token_id: U256::from(0xabc),
            maker_amount: U256::from(9910u64) * U256::exp10(15),
            taker_amount: U256::exp10(19),
            expiration: 0,
            nonce: 0,
            fee_rate_bps: 0,
            side: Side::Buy,
            signature_type: 1,
        }
    }

    #[test]
    fn test_address_derivation_matches_known_key() {
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let expected: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            .parse()
            .unwrap();
        assert_eq!(credential.address(), expected);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!(SignerCredential::from_private_key("not-hex").is_err());
        assert!(SignerCredential::from_private_key("0x1234").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("ac0974be"));
    }

    #[test]
    fn test_domain_separator_depends_on_chain() {
        let exchange: Address = protocol::EXCHANGE_ADDRESS.parse().unwrap();
        let mainnet = compute_domain_separator(56, exchange);
        let testnet = compute_domain_separator(97, exchange);
        assert_ne!(mainnet, H256::zero());
        assert_ne!(mainnet, testnet);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let engine = SignatureEngine::new(&ClientConfig::default());
        let order = test_order(&credential);

        assert_eq!(engine.digest(&order), engine.digest(&order));

        let mut changed = order.clone();
        changed.salt += 1;
        assert_ne!(engine.digest(&order), engine.digest(&changed));
    }

    #[test]
    fn test_signature_is_deterministic() {
        // RFC-6979 nonces: identical input yields identical bytes.
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let engine = SignatureEngine::new(&ClientConfig::default());
        let order = test_order(&credential);

        let first = engine.sign(order.clone(), &credential).unwrap();
        let second = engine.sign(order, &credential).unwrap();
        assert_eq!(first.signature, second.signature);
    }

    #[test]
    fn test_envelope_packing() {
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let engine = SignatureEngine::new(&ClientConfig::default());
        let signed = engine.sign(test_order(&credential), &credential).unwrap();

        // 0x + 20-byte address + 65-byte signature
        assert_eq!(signed.signature.len(), 2 + ENVELOPE_LEN * 2);
        assert!(signed
            .signature
            .starts_with("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"));

        let v = u8::from_str_radix(&signed.signature[signed.signature.len() - 2..], 16).unwrap();
        assert!(v == 27 || v == 28);
    }

    #[test]
    fn test_signer_mismatch_is_rejected() {
        let credential = SignerCredential::from_private_key(TEST_KEY).unwrap();
        let engine = SignatureEngine::new(&ClientConfig::default());

        let mut order = test_order(&credential);
        order.signer = Address::zero();
        assert!(matches!(
            engine.sign(order, &credential),
            Err(ClientError::SigningFailure(_))
        ));
    }
}
