//! Error types for the ASN.1 value tree.

use thiserror::Error;

/// Errors that can occur while decoding, encoding or building values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    Ber(#[from] ber::Error),

    // Integer errors
    #[error("INTEGER: value out of range for i64")]
    IntegerOutOfRangeI64,
    #[error("INTEGER: value out of range for u64")]
    IntegerOutOfRangeU64,

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: empty string")]
    ObjectIdentifierEmptyString,
    #[error("OBJECT IDENTIFIER: invalid component '{0}'")]
    ObjectIdentifierInvalidComponent(String),
    #[error("OBJECT IDENTIFIER: second arc {0} must be below 40 under arcs 0 and 1")]
    ObjectIdentifierSecondArcOutOfRange(String),

    // BitString errors
    #[error("BIT STRING: unused bit count {0} exceeds 7")]
    BitStringUnusedBitsOutOfRange(u8),

    // Element errors
    #[error("element: {0} is not a character string type")]
    ElementNotCharacterString(String),
}

pub type Result<T> = std::result::Result<T, Error>;
