use std::borrow::Cow;

use super::constructed::{SegmentKind, reassemble};
use super::{check_expected_tag, check_segment_len, read_header};
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber, ensure_universal_matches};

/// Reads the octets of an OCTET STRING shaped value in either form.
///
/// Character strings and times share this layout, so `universal` names the
/// type the expected tag is checked against.
pub(crate) fn read_string_bytes<'a>(
    input: &'a [u8],
    rules: EncodingRules,
    expected: Tag,
    universal: UniversalTagNumber,
) -> Result<(Cow<'a, [u8]>, usize)> {
    if let Some((bytes, consumed)) = try_read_primitive_string(input, rules, expected, universal)? {
        return Ok((Cow::Borrowed(bytes), consumed));
    }

    let header = read_header(input, rules)?;
    let out = reassemble(
        &input[header.header_len..],
        header.length,
        rules,
        SegmentKind::Octets,
        header.tag,
    )?;
    Ok((Cow::Owned(out.data), header.header_len + out.consumed))
}

/// Returns `Ok(None)` when the value uses the constructed form.
pub(crate) fn try_read_primitive_string<'a>(
    input: &'a [u8],
    rules: EncodingRules,
    expected: Tag,
    universal: UniversalTagNumber,
) -> Result<Option<(&'a [u8], usize)>> {
    ensure_universal_matches(expected, universal)?;
    let header = read_header(input, rules)?;
    check_expected_tag(header.tag, expected)?;

    if header.tag.is_constructed() {
        if !rules.allows_constructed_strings() {
            return Err(Error::DerConstructedString(header.tag));
        }
        return Ok(None);
    }

    let len = header.length.ok_or(Error::IndefinitePrimitive)?;
    let rest = &input[header.header_len..];
    let content = rest.get(..len).ok_or(Error::LengthExceedsInput {
        length: len,
        remaining: rest.len(),
    })?;
    check_segment_len(len, rules)?;
    Ok(Some((content, header.header_len + len)))
}

/// Reads a primitive OCTET STRING without copying. `Ok(None)` means the value
/// uses the constructed form and must be read with [`read_octet_string`].
pub fn try_read_primitive_octet_string(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(&[u8], usize)>> {
    try_read_primitive_string(
        input,
        rules,
        tag.unwrap_or(Tag::OCTET_STRING),
        UniversalTagNumber::OctetString,
    )
}

pub fn read_octet_string(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(Vec<u8>, usize)> {
    let (bytes, consumed) = read_string_bytes(
        input,
        rules,
        tag.unwrap_or(Tag::OCTET_STRING),
        UniversalTagNumber::OctetString,
    )?;
    Ok((bytes.into_owned(), consumed))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::{read_octet_string, try_read_primitive_octet_string};
    use crate::error::Error;
    use crate::rules::EncodingRules;
    use crate::tag::Tag;

    #[rstest]
    #[case(&hex!("0400"), EncodingRules::Der, vec![])]
    #[case(&hex!("0403 010203"), EncodingRules::Der, vec![1, 2, 3])]
    #[case(&hex!("2480 0402 0102 0401 03 0000"), EncodingRules::Ber, vec![1, 2, 3])]
    #[case(&hex!("2407 0402 0102 0401 03"), EncodingRules::Ber, vec![1, 2, 3])]
    fn test_read_octet_string(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] expected: Vec<u8>,
    ) {
        let (data, consumed) = read_octet_string(input, rules, None).unwrap();
        assert_eq!(data, expected);
        assert_eq!(consumed, input.len());
    }

    #[rstest]
    #[case(&hex!("2407 0402 0102 0401 03"), EncodingRules::Der, Error::DerConstructedString(Tag::CONSTRUCTED_OCTET_STRING))]
    #[case(&hex!("2407 0402 0102 0401 03"), EncodingRules::Cer, Error::CerDefiniteConstructed)]
    #[case(&hex!("0405 0102"), EncodingRules::Ber, Error::LengthExceedsInput { length: 5, remaining: 2 })]
    fn test_read_octet_string_error(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] expected: Error,
    ) {
        assert_eq!(read_octet_string(input, rules, None).unwrap_err(), expected);
    }

    #[test]
    fn test_read_octet_string_cer_primitive_limit() {
        let mut input = vec![0x04, 0x82, 0x03, 0xe9];
        input.extend(std::iter::repeat_n(0xaa, 1001));
        assert_eq!(
            read_octet_string(&input, EncodingRules::Cer, None).unwrap_err(),
            Error::CerPrimitiveTooLong(1001)
        );
        assert_eq!(read_octet_string(&input, EncodingRules::Der, None).unwrap().0.len(), 1001);
    }

    #[test]
    fn test_try_read_primitive_octet_string() {
        let input = hex!("8002 abcd");
        let tag = Tag::context_specific(0, false);
        let (data, consumed) = try_read_primitive_octet_string(&input, EncodingRules::Der, Some(tag))
            .unwrap()
            .unwrap();
        assert_eq!(data, &[0xab, 0xcd]);
        assert_eq!(consumed, 4);

        let constructed = hex!("2480 0000");
        assert!(
            try_read_primitive_octet_string(&constructed, EncodingRules::Ber, None)
                .unwrap()
                .is_none()
        );
    }
}
