use num_bigint::BigInt;

use super::primitive_content;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Rejects empty content and a redundant leading sign byte.
pub(crate) fn check_minimal(content: &[u8]) -> Result<()> {
    match content {
        [] => Err(Error::IntegerNoData),
        [0x00, next, ..] if next & 0x80 == 0 => Err(Error::IntegerNonMinimal),
        [0xff, next, ..] if next & 0x80 != 0 => Err(Error::IntegerNonMinimal),
        _ => Ok(()),
    }
}

fn integer_content(
    input: &[u8],
    rules: EncodingRules,
    expected: Tag,
    universal: UniversalTagNumber,
) -> Result<(&[u8], usize)> {
    let (content, consumed) = primitive_content(input, rules, expected, universal)?;
    check_minimal(content)?;
    Ok((content, consumed))
}

fn signed(content: &[u8], width: usize) -> Option<i64> {
    if content.len() > width {
        return None;
    }
    let seed: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    Some(
        content
            .iter()
            .fold(seed, |value, &byte| (value << 8) | i64::from(byte)),
    )
}

fn unsigned(content: &[u8], width: usize) -> Option<u64> {
    if content[0] & 0x80 != 0 {
        return None;
    }
    let digits = match content {
        [0x00, rest @ ..] if !rest.is_empty() => rest,
        _ => content,
    };
    if digits.len() > width {
        return None;
    }
    Some(
        digits
            .iter()
            .fold(0u64, |value, &byte| (value << 8) | u64::from(byte)),
    )
}

/// Returns the two's complement content octets of an INTEGER.
pub fn read_integer_bytes(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(&[u8], usize)> {
    integer_content(
        input,
        rules,
        tag.unwrap_or(Tag::INTEGER),
        UniversalTagNumber::Integer,
    )
}

pub fn read_integer(input: &[u8], rules: EncodingRules, tag: Option<Tag>) -> Result<(BigInt, usize)> {
    let (content, consumed) = read_integer_bytes(input, rules, tag)?;
    Ok((BigInt::from_signed_bytes_be(content), consumed))
}

/// Reads an INTEGER into an `i64`. `Ok(None)` means the value does not fit.
pub fn try_read_i64(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(i64, usize)>> {
    let (content, consumed) = read_integer_bytes(input, rules, tag)?;
    Ok(signed(content, 8).map(|value| (value, consumed)))
}

pub fn try_read_i32(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(i32, usize)>> {
    let (content, consumed) = read_integer_bytes(input, rules, tag)?;
    Ok(signed(content, 4)
        .and_then(|value| i32::try_from(value).ok())
        .map(|value| (value, consumed)))
}

/// Reads an INTEGER into a `u64`. Negative values do not fit.
pub fn try_read_u64(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(u64, usize)>> {
    let (content, consumed) = read_integer_bytes(input, rules, tag)?;
    Ok(unsigned(content, 8).map(|value| (value, consumed)))
}

pub fn try_read_u32(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<Option<(u32, usize)>> {
    let (content, consumed) = read_integer_bytes(input, rules, tag)?;
    Ok(unsigned(content, 4)
        .and_then(|value| u32::try_from(value).ok())
        .map(|value| (value, consumed)))
}

pub fn read_enumerated_bytes(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(&[u8], usize)> {
    integer_content(
        input,
        rules,
        tag.unwrap_or(Tag::ENUMERATED),
        UniversalTagNumber::Enumerated,
    )
}

/// Reads an ENUMERATED and converts it into `T`, typically a fieldless enum
/// implementing `TryFrom<i64>`.
pub fn read_enumerated_value<T: TryFrom<i64>>(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(T, usize)> {
    let (content, consumed) = read_enumerated_bytes(input, rules, tag)?;
    let value = signed(content, 8)
        .and_then(|value| T::try_from(value).ok())
        .ok_or(Error::EnumeratedOutOfRange)?;
    Ok((value, consumed))
}
