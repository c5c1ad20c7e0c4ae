//! Error types for BER, CER and DER encoding and decoding.

use thiserror::Error;

use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};
use crate::writer::ScopeKind;

/// Errors produced while reading or writing X.690 encodings.
///
/// Most variants describe input that violates X.690 or the selected
/// [`EncodingRules`]. The variants listed by [`Error::is_usage_error`] instead
/// report a caller defect such as popping a scope that was never pushed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("input ended before the encoding was complete")]
    Incomplete,
    #[error("{0} trailing bytes after the final value")]
    TrailingData(usize),

    // Tag errors
    #[error("TAG: high tag number form has a leading zero octet")]
    TagNonMinimal,
    #[error("TAG: number {0} must use the low tag number form")]
    TagLowFormRequired(u64),
    #[error("TAG: number does not fit in 64 bits")]
    TagOverflow,
    #[error("unexpected tag: expected {expected}, found {actual}")]
    UnexpectedTag { expected: Tag, actual: Tag },
    #[error("{0}: primitive encoding required")]
    PrimitiveRequired(Tag),
    #[error("{0}: constructed encoding required")]
    ConstructedRequired(Tag),

    // Length errors
    #[error("LENGTH: 0xFF is reserved")]
    LengthReserved,
    #[error("LENGTH: {0} requires the minimal length encoding")]
    LengthNonMinimal(EncodingRules),
    #[error("LENGTH: value does not fit in 32 bits")]
    LengthTooLarge,
    #[error("LENGTH: {length} exceeds the {remaining} remaining bytes")]
    LengthExceedsInput { length: usize, remaining: usize },
    #[error("LENGTH: indefinite length is not permitted under DER")]
    IndefiniteLengthProhibited,
    #[error("LENGTH: primitive encodings require a definite length")]
    IndefinitePrimitive,
    #[error("LENGTH: CER requires the indefinite form for constructed encodings")]
    CerDefiniteConstructed,

    // End-of-contents errors
    #[error("END-OF-CONTENTS: marker must be primitive with zero length")]
    EndOfContentsMalformed,
    #[error("END-OF-CONTENTS: marker missing")]
    EndOfContentsMissing,
    #[error("END-OF-CONTENTS: marker inside a definite length encoding")]
    EndOfContentsUnexpected,

    // Constructed string errors
    #[error("{0}: constructed form is not permitted under DER")]
    DerConstructedString(Tag),
    #[error("{0}: unexpected segment {1}")]
    SegmentInvalid(Tag, Tag),
    #[error("CER: nested constructed string segments are not permitted")]
    CerNestedSegment,
    #[error("CER: segment before the last has {0} content octets, 1000 required")]
    CerSegmentSize(usize),
    #[error("CER: primitive string of {0} octets exceeds 1000")]
    CerPrimitiveTooLong(usize),

    // Boolean errors
    #[error("BOOLEAN: content must be exactly one byte, found {0}")]
    BooleanInvalidLength(usize),
    #[error("BOOLEAN: {0:#04x} is not canonical")]
    BooleanNonCanonical(u8),

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: redundant leading sign byte")]
    IntegerNonMinimal,
    #[error("ENUMERATED: value does not fit the target type")]
    EnumeratedOutOfRange,

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),
    #[error("BIT STRING: {0} unused bits with no data")]
    BitStringUnusedBitsWithoutData(u8),
    #[error("BIT STRING: unused bits must be zero")]
    BitStringNonZeroPadding,
    #[error("BIT STRING: only the last segment may have unused bits")]
    BitStringUnusedBitsInSegment,
    #[error("BIT STRING: named bit list of {0} bytes exceeds 64 bits")]
    NamedBitListTooLong(usize),

    // Null errors
    #[error("NULL: content must be empty, found {0} bytes")]
    NullNotEmpty(usize),

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: sub-identifier has a leading 0x80 octet")]
    ObjectIdentifierNonMinimal,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,

    // Character string errors
    #[error("{0:?}: content is not valid for the string type")]
    CharacterStringInvalid(UniversalTagNumber),

    // Time errors
    #[error("UTCTime: invalid format")]
    UtcTimeInvalidFormat,
    #[error("GeneralizedTime: invalid format")]
    GeneralizedTimeInvalidFormat,

    // SetOf errors
    #[error("SET OF: members are not in canonical order")]
    SetOfUnsorted,

    // Usage errors
    #[error("tag {actual} is universal but the value is {expected:?}")]
    UniversalTagMismatch {
        expected: UniversalTagNumber,
        actual: Tag,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("{0:?} has no character encoding")]
    UnsupportedStringType(UniversalTagNumber),
    #[error("UTCTime: two digit year maximum {0} out of range (must be 1-9999)")]
    UtcPivotOutOfRange(u16),
    #[error("value is not exactly one encoding under {0}")]
    EncodedValueInvalid(EncodingRules),
    #[error("no scope is open")]
    NoOpenScope,
    #[error("{open_kind:?} scope {open} is open but {popped_kind:?} {popped} was popped")]
    ScopeMismatch {
        open: Tag,
        open_kind: ScopeKind,
        popped: Tag,
        popped_kind: ScopeKind,
    },
    #[error("{0} scopes are still open")]
    UnbalancedScope(usize),
    #[error("writer is finished, call reset before writing again")]
    WriterFinished,
}

impl Error {
    /// Returns `true` when the error reports a caller defect rather than bad input.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::UniversalTagMismatch { .. }
                | Error::InvalidArgument(_)
                | Error::UnsupportedStringType(_)
                | Error::UtcPivotOutOfRange(_)
                | Error::EncodedValueInvalid(_)
                | Error::NoOpenScope
                | Error::ScopeMismatch { .. }
                | Error::UnbalancedScope(_)
                | Error::WriterFinished
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
