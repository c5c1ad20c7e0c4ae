use super::constructed::{SegmentKind, reassemble};
use super::{check_expected_tag, check_segment_len, read_header};
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber, ensure_universal_matches};

/// Content of a primitive BIT STRING: the unused bit count followed by data.
pub(crate) struct PrimitiveBits<'a> {
    pub unused_bits: u8,
    pub data: &'a [u8],
    /// Replacement for the final data byte when BER padding bits were set.
    pub normalized_last: Option<u8>,
}

pub(crate) fn parse_primitive(content: &[u8], rules: EncodingRules) -> Result<PrimitiveBits<'_>> {
    let (&unused_bits, data) = content.split_first().ok_or(Error::BitStringNoData)?;

    if unused_bits > 7 {
        return Err(Error::BitStringUnusedBitsOutOfRange(unused_bits));
    }

    let Some(&last) = data.last() else {
        if unused_bits != 0 {
            return Err(Error::BitStringUnusedBitsWithoutData(unused_bits));
        }
        return Ok(PrimitiveBits {
            unused_bits,
            data,
            normalized_last: None,
        });
    };

    let padding = (1u8 << unused_bits) - 1;
    let normalized_last = if last & padding != 0 {
        if rules.is_canonical() {
            return Err(Error::BitStringNonZeroPadding);
        }
        Some(last & !padding)
    } else {
        None
    };

    Ok(PrimitiveBits {
        unused_bits,
        data,
        normalized_last,
    })
}

/// Reads a primitive BIT STRING without copying, returning the data, the
/// unused bit count and the bytes consumed.
///
/// Returns `Ok(None)` when the value uses the constructed form or when BER
/// padding bits are set, since the data then differs from the encoded bytes.
pub fn try_read_primitive_bit_string(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(&[u8], u8, usize)>> {
    let expected = tag.unwrap_or(Tag::BIT_STRING);
    ensure_universal_matches(expected, UniversalTagNumber::BitString)?;
    let header = read_header(input, rules)?;
    check_expected_tag(header.tag, expected)?;

    if header.tag.is_constructed() {
        if !rules.allows_constructed_strings() {
            return Err(Error::DerConstructedString(header.tag));
        }
        return Ok(None);
    }

    let (content, consumed) = primitive_bytes(input, &header, rules)?;
    let parsed = parse_primitive(content, rules)?;
    if parsed.normalized_last.is_some() {
        return Ok(None);
    }
    Ok(Some((parsed.data, parsed.unused_bits, consumed)))
}

/// Reads a BIT STRING in either form, returning the data, the unused bit
/// count and the bytes consumed. Padding bits are cleared in the result.
pub fn read_bit_string(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(Vec<u8>, u8, usize)> {
    let expected = tag.unwrap_or(Tag::BIT_STRING);
    ensure_universal_matches(expected, UniversalTagNumber::BitString)?;
    let header = read_header(input, rules)?;
    check_expected_tag(header.tag, expected)?;

    if header.tag.is_constructed() {
        if !rules.allows_constructed_strings() {
            return Err(Error::DerConstructedString(header.tag));
        }
        let out = reassemble(
            &input[header.header_len..],
            header.length,
            rules,
            SegmentKind::Bits,
            header.tag,
        )?;
        return Ok((out.data, out.unused_bits, header.header_len + out.consumed));
    }

    let (content, consumed) = primitive_bytes(input, &header, rules)?;
    let parsed = parse_primitive(content, rules)?;
    let mut data = parsed.data.to_vec();
    if let (Some(last), Some(slot)) = (parsed.normalized_last, data.last_mut()) {
        *slot = last;
    }
    Ok((data, parsed.unused_bits, consumed))
}

/// Reads a BIT STRING holding a named bit list and returns it as flags,
/// where bit 0 of the result is the first named bit.
pub fn read_named_bit_list(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(u64, usize)> {
    let (data, _, consumed) = read_bit_string(input, rules, tag)?;
    if data.len() > std::mem::size_of::<u64>() {
        return Err(Error::NamedBitListTooLong(data.len()));
    }

    let flags = data
        .iter()
        .enumerate()
        .fold(0u64, |flags, (i, byte)| {
            flags | (u64::from(byte.reverse_bits()) << (8 * i))
        });
    Ok((flags, consumed))
}

fn primitive_bytes<'a>(
    input: &'a [u8],
    header: &super::Header,
    rules: EncodingRules,
) -> Result<(&'a [u8], usize)> {
    let len = header.length.ok_or(Error::IndefinitePrimitive)?;
    let rest = &input[header.header_len..];
    let content = rest.get(..len).ok_or(Error::LengthExceedsInput {
        length: len,
        remaining: rest.len(),
    })?;
    check_segment_len(len, rules)?;
    Ok((content, header.header_len + len))
}
