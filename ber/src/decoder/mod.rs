//! Stateless decoding functions.
//!
//! Every function takes the input positioned at an identifier octet, the
//! [`EncodingRules`] to enforce and optionally the tag the value is expected
//! to carry (`None` selects the universal tag of the type). On success the
//! decoded value is returned together with the number of bytes consumed.

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::length;
use crate::rules::{CER_SEGMENT_LEN, EncodingRules};
use crate::tag::{Tag, UniversalTagNumber, ensure_universal_matches};

pub mod bit_string;
pub mod boolean;
mod constructed;
pub mod integer;
pub mod null;
pub mod octet_string;
pub mod oid;
pub mod sequence;
pub mod string;
pub mod time;

pub use bit_string::{read_bit_string, read_named_bit_list, try_read_primitive_bit_string};
pub use boolean::read_boolean;
pub use integer::{
    read_enumerated_bytes, read_enumerated_value, read_integer, read_integer_bytes, try_read_i32,
    try_read_i64, try_read_u32, try_read_u64,
};
pub use null::read_null;
pub use octet_string::{read_octet_string, try_read_primitive_octet_string};
pub use oid::read_object_identifier;
pub use sequence::{read_constructed, read_sequence, read_set_of};
pub use string::{read_character_string, try_read_primitive_character_string_bytes};
pub use time::{read_generalized_time, read_utc_time};

/// Identifier and length octets of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    /// `None` for the indefinite form.
    pub length: Option<usize>,
    pub header_len: usize,
}

/// Location of one complete value within an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedValue {
    pub tag: Tag,
    pub header_len: usize,
    pub content_len: usize,
    /// Header, content and, for indefinite lengths, the end-of-contents marker.
    pub consumed: usize,
}

impl EncodedValue {
    pub fn content<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.header_len..self.header_len + self.content_len]
    }

    pub fn encoding<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[..self.consumed]
    }
}

/// Reads the identifier and length octets and checks that the length form
/// is legal for the tag under `rules`.
pub fn read_header(input: &[u8], rules: EncodingRules) -> Result<Header> {
    let (tag, tag_len) = Tag::decode(input)?;
    let (length, length_len) = length::decode(&input[tag_len..], rules)?;

    match length {
        None if !tag.is_constructed() => return Err(Error::IndefinitePrimitive),
        Some(_) if tag.is_constructed() && !rules.allows_definite_constructed() => {
            return Err(Error::CerDefiniteConstructed);
        }
        _ => {}
    }

    trace!("header {} length {:?} ({} octets)", tag, length, tag_len + length_len);
    Ok(Header {
        tag,
        length,
        header_len: tag_len + length_len,
    })
}

/// Locates the next complete value, resolving indefinite lengths by scanning
/// for the matching end-of-contents marker.
pub fn read_encoded_value(input: &[u8], rules: EncodingRules) -> Result<EncodedValue> {
    let header = read_header(input, rules)?;
    let rest = &input[header.header_len..];

    let (content_len, consumed) = match header.length {
        Some(len) => {
            if len > rest.len() {
                return Err(Error::LengthExceedsInput {
                    length: len,
                    remaining: rest.len(),
                });
            }
            (len, header.header_len + len)
        }
        None => {
            let len = seek_end_of_contents(rest, rules)?;
            (len, header.header_len + len + END_OF_CONTENTS_LEN)
        }
    };

    Ok(EncodedValue {
        tag: header.tag,
        header_len: header.header_len,
        content_len,
        consumed,
    })
}

pub(crate) const END_OF_CONTENTS_LEN: usize = 2;

/// Returns the content length of an indefinite length value whose content
/// starts at `input`, excluding the closing end-of-contents marker.
fn seek_end_of_contents(input: &[u8], rules: EncodingRules) -> Result<usize> {
    let mut pos = 0;
    let mut depth: usize = 1;

    while pos < input.len() {
        let header = read_header(&input[pos..], rules)?;

        if header.tag.has_same_class_and_number(&Tag::END_OF_CONTENTS) {
            validate_end_of_contents(&header)?;
            depth -= 1;
            if depth == 0 {
                return Ok(pos);
            }
            pos += header.header_len;
            continue;
        }

        match header.length {
            None => {
                depth += 1;
                pos += header.header_len;
            }
            Some(len) => {
                let end = pos + header.header_len + len;
                if end > input.len() {
                    return Err(Error::LengthExceedsInput {
                        length: len,
                        remaining: input.len() - pos - header.header_len,
                    });
                }
                pos = end;
            }
        }
    }

    debug!("no end-of-contents marker within {} bytes", input.len());
    Err(Error::EndOfContentsMissing)
}

pub(crate) fn validate_end_of_contents(header: &Header) -> Result<()> {
    if header.tag.is_constructed() || header.length != Some(0) {
        return Err(Error::EndOfContentsMalformed);
    }
    Ok(())
}

/// CER caps every primitive string encoding at 1000 content octets.
pub(crate) fn check_segment_len(len: usize, rules: EncodingRules) -> Result<()> {
    if rules.is_cer() && len > CER_SEGMENT_LEN {
        return Err(Error::CerPrimitiveTooLong(len));
    }
    Ok(())
}

pub(crate) fn check_expected_tag(actual: Tag, expected: Tag) -> Result<()> {
    if !actual.has_same_class_and_number(&expected) {
        debug!("expected {} but found {}", expected, actual);
        return Err(Error::UnexpectedTag { expected, actual });
    }
    Ok(())
}

/// Reads a value that must use the primitive encoding and returns its
/// content octets.
pub(crate) fn primitive_content(
    input: &[u8],
    rules: EncodingRules,
    expected: Tag,
    universal: UniversalTagNumber,
) -> Result<(&[u8], usize)> {
    ensure_universal_matches(expected, universal)?;
    let header = read_header(input, rules)?;
    check_expected_tag(header.tag, expected)?;

    if header.tag.is_constructed() {
        return Err(Error::PrimitiveRequired(header.tag));
    }
    let len = header.length.ok_or(Error::IndefinitePrimitive)?;
    let rest = &input[header.header_len..];
    let content = rest.get(..len).ok_or(Error::LengthExceedsInput {
        length: len,
        remaining: rest.len(),
    })?;

    Ok((content, header.header_len + len))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::{read_encoded_value, read_header};
    use crate::error::Error;
    use crate::rules::EncodingRules;
    use crate::tag::Tag;

    #[rstest]
    #[case(&hex!("0500"), EncodingRules::Der, Tag::NULL, 2, 0, 2)]
    #[case(&hex!("040301020399"), EncodingRules::Der, Tag::OCTET_STRING, 2, 3, 5)]
    #[case(&hex!("3080 0500 0000"), EncodingRules::Ber, Tag::SEQUENCE, 2, 2, 6)]
    #[case(&hex!("3080 0500 0000"), EncodingRules::Cer, Tag::SEQUENCE, 2, 2, 6)]
    // nested indefinite lengths
    #[case(&hex!("3080 3080 0101ff 0000 0000"), EncodingRules::Ber, Tag::SEQUENCE, 2, 7, 11)]
    // definite inside indefinite
    #[case(&hex!("a080 3003 020101 0000"), EncodingRules::Ber, Tag::context_specific(0, true), 2, 5, 9)]
    fn test_read_encoded_value(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] tag: Tag,
        #[case] header_len: usize,
        #[case] content_len: usize,
        #[case] consumed: usize,
    ) {
        let value = read_encoded_value(input, rules).unwrap();
        assert_eq!(value.tag, tag);
        assert_eq!(value.header_len, header_len);
        assert_eq!(value.content_len, content_len);
        assert_eq!(value.consumed, consumed);
    }

    #[rstest]
    // primitive with indefinite length
    #[case(&hex!("0480 0000"), EncodingRules::Ber, Error::IndefinitePrimitive)]
    // indefinite length under DER
    #[case(&hex!("3080 0000"), EncodingRules::Der, Error::IndefiniteLengthProhibited)]
    // CER constructed values must be indefinite
    #[case(&hex!("3000"), EncodingRules::Cer, Error::CerDefiniteConstructed)]
    // content shorter than the length
    #[case(&hex!("0405 0102"), EncodingRules::Ber, Error::LengthExceedsInput { length: 5, remaining: 2 })]
    // no end-of-contents marker
    #[case(&hex!("3080 0500"), EncodingRules::Ber, Error::EndOfContentsMissing)]
    // end-of-contents with content
    #[case(&hex!("3080 0001 00"), EncodingRules::Ber, Error::EndOfContentsMalformed)]
    // truncated header
    #[case(&hex!("30"), EncodingRules::Ber, Error::Incomplete)]
    fn test_read_encoded_value_error(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] expected: Error,
    ) {
        assert_eq!(read_encoded_value(input, rules).unwrap_err(), expected);
    }

    #[test]
    fn test_read_encoded_value_content() {
        let input = hex!("3080 020105 0000 ff");
        let value = read_encoded_value(&input, EncodingRules::Ber).unwrap();
        assert_eq!(value.content(&input), &hex!("020105"));
        assert_eq!(value.encoding(&input), &hex!("3080 020105 0000"));
    }

    #[test]
    fn test_read_header_redundant_length() {
        let input = hex!("04 81 01 aa");
        assert_eq!(read_header(&input, EncodingRules::Ber).unwrap().length, Some(1));
        assert_eq!(
            read_header(&input, EncodingRules::Der).unwrap_err(),
            Error::LengthNonMinimal(EncodingRules::Der)
        );
    }
}
