use log::debug;

use super::{check_expected_tag, read_encoded_value};
use crate::compare::canonical_cmp;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber, ensure_universal_matches};

fn constructed_content(
    input: &[u8],
    rules: EncodingRules,
    expected: Tag,
    universal: UniversalTagNumber,
) -> Result<(&[u8], usize)> {
    ensure_universal_matches(expected, universal)?;
    let value = read_encoded_value(input, rules)?;
    check_expected_tag(value.tag, expected)?;
    if !value.tag.is_constructed() {
        return Err(Error::ConstructedRequired(value.tag));
    }
    Ok((value.content(input), value.consumed))
}

/// Reads a SEQUENCE and returns its content octets, which hold the encodings
/// of the members.
pub fn read_sequence(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(&[u8], usize)> {
    constructed_content(
        input,
        rules,
        tag.unwrap_or(Tag::SEQUENCE),
        UniversalTagNumber::Sequence,
    )
}

/// Reads a constructed value of any tag and returns its content octets.
pub fn read_constructed(input: &[u8], rules: EncodingRules, tag: Tag) -> Result<(&[u8], usize)> {
    let value = read_encoded_value(input, rules)?;
    check_expected_tag(value.tag, tag)?;
    if !value.tag.is_constructed() {
        return Err(Error::ConstructedRequired(value.tag));
    }
    Ok((value.content(input), value.consumed))
}

/// Reads a SET OF and returns its content octets.
///
/// Under CER and DER the members must appear in canonical order unless
/// `skip_sort_verification` is set.
pub fn read_set_of(
    input: &[u8],
    rules: EncodingRules,
    skip_sort_verification: bool,
    tag: Option<Tag>,
) -> Result<(&[u8], usize)> {
    let (content, consumed) =
        constructed_content(input, rules, tag.unwrap_or(Tag::SET_OF), UniversalTagNumber::Set)?;

    if rules.is_canonical() && !skip_sort_verification {
        let mut previous: Option<&[u8]> = None;
        let mut pos = 0;
        while pos < content.len() {
            let member = read_encoded_value(&content[pos..], rules)?;
            let encoding = member.encoding(&content[pos..]);
            if let Some(previous) = previous {
                if canonical_cmp(previous, encoding).is_gt() {
                    debug!("SET OF member at offset {} is out of order", pos);
                    return Err(Error::SetOfUnsorted);
                }
            }
            previous = Some(encoding);
            pos += member.consumed;
        }
    }

    Ok((content, consumed))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::{read_constructed, read_sequence, read_set_of};
    use crate::error::Error;
    use crate::rules::EncodingRules;
    use crate::tag::{Tag, TagClass};

    #[rstest]
    #[case(&hex!("3006 020101 020102"), EncodingRules::Der, &hex!("020101 020102"))]
    #[case(&hex!("3080 020101 020102 0000"), EncodingRules::Ber, &hex!("020101 020102"))]
    #[case(&hex!("3080 020101 020102 0000"), EncodingRules::Cer, &hex!("020101 020102"))]
    #[case(&hex!("3000"), EncodingRules::Der, &[])]
    fn test_read_sequence(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] expected: &[u8],
    ) {
        let (content, consumed) = read_sequence(input, rules, None).unwrap();
        assert_eq!(content, expected);
        assert_eq!(consumed, input.len());
    }

    #[rstest]
    #[case(&hex!("1000"), Error::ConstructedRequired(Tag::SEQUENCE.as_primitive()))]
    #[case(&hex!("3100"), Error::UnexpectedTag { expected: Tag::SEQUENCE, actual: Tag::SET_OF })]
    fn test_read_sequence_error(#[case] input: &[u8], #[case] expected: Error) {
        assert_eq!(read_sequence(input, EncodingRules::Der, None).unwrap_err(), expected);
    }

    #[test]
    fn test_read_sequence_implicit_tag() {
        let input = hex!("a103 020105");
        let (content, _) =
            read_sequence(&input, EncodingRules::Der, Some(Tag::context_specific(1, true))).unwrap();
        assert_eq!(content, &hex!("020105"));
    }

    #[rstest]
    #[case(EncodingRules::Ber, false, true)]
    #[case(EncodingRules::Der, false, false)]
    #[case(EncodingRules::Der, true, true)]
    fn test_read_set_of_order(
        #[case] rules: EncodingRules,
        #[case] skip: bool,
        #[case] valid: bool,
    ) {
        let unsorted = hex!("3106 020102 020101");
        let result = read_set_of(&unsorted, rules, skip, None);
        assert_eq!(result.is_ok(), valid);
        if !valid {
            assert_eq!(result.unwrap_err(), Error::SetOfUnsorted);
        }
    }

    #[test]
    fn test_read_set_of_sorted() {
        let input = hex!("3180 0401aa 0402aa00 0000");
        let (content, consumed) = read_set_of(&input, EncodingRules::Cer, false, None).unwrap();
        assert_eq!(content, &hex!("0401aa 0402aa00"));
        assert_eq!(consumed, input.len());
    }

    #[rstest]
    // EXTERNAL
    #[case(&hex!("2880 3080 0000 0000"), Tag::new(TagClass::Universal, true, 8), &hex!("3080 0000"))]
    #[case(&hex!("a203 020105"), Tag::context_specific(2, true), &hex!("020105"))]
    fn test_read_constructed(#[case] input: &[u8], #[case] tag: Tag, #[case] expected: &[u8]) {
        let (content, consumed) = read_constructed(input, EncodingRules::Ber, tag).unwrap();
        assert_eq!(content, expected);
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_read_constructed_requires_constructed_form() {
        let input = hex!("8201 05");
        assert_eq!(
            read_constructed(&input, EncodingRules::Der, Tag::context_specific(2, true)).unwrap_err(),
            Error::ConstructedRequired(Tag::context_specific(2, false))
        );
    }
}
