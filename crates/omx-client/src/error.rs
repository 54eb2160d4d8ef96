//! Error types for the order engine.
//!
//! One enum covers every failure mode. Validation errors (`InvalidIntent`,
//! `InvalidPrice`, `PrecisionOverflow`, `UnknownOutcome`) are raised before
//! any network or signing side effect. `MetadataUnavailable` is the only
//! retriable kind; `Transport` wraps collaborator errors unchanged.

use thiserror::Error;

/// Errors that can occur while building, signing or submitting orders.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Intent fields are malformed (bad quantity shape, zero-valued
    /// amounts, unparseable token id). Fatal to the call.
    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    /// Price is out of range or carries more than one fractional digit.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Decimal input exceeds the 18-decimal fixed-point scale.
    #[error("precision overflow: {0}")]
    PrecisionOverflow(String),

    /// Outcome selector is neither YES nor NO.
    #[error("unknown outcome selector: {0}")]
    UnknownOutcome(String),

    /// Metadata fetch failed; the cache is left unmodified and the caller
    /// may retry.
    #[error("market metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// Credential or digest construction failed. Never retried
    /// automatically.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// Submission/query collaborator error, propagated unchanged.
    #[error("transport error: {0}")]
    Transport(String),
}
