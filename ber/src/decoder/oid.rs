use std::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::primitive_content;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Sub-identifiers of up to nine septets fit in a `u64`.
const MAX_SMALL_SEPTETS: usize = 9;

enum Arc {
    Small(u64),
    Big(BigUint),
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arc::Small(value) => write!(f, "{}", value),
            Arc::Big(value) => write!(f, "{}", value),
        }
    }
}

/// Decodes OBJECT IDENTIFIER content octets into dotted decimal text.
pub(crate) fn decode_content(content: &[u8]) -> Result<String> {
    if content.is_empty() {
        return Err(Error::ObjectIdentifierNoData);
    }

    let mut text = String::new();
    let mut pos = 0;
    while pos < content.len() {
        let (arc, len) = sub_identifier(&content[pos..])?;
        if pos == 0 {
            write_first_arcs(&mut text, arc);
        } else {
            text.push('.');
            text.push_str(&arc.to_string());
        }
        pos += len;
    }
    Ok(text)
}

fn sub_identifier(input: &[u8]) -> Result<(Arc, usize)> {
    if input[0] == 0x80 {
        return Err(Error::ObjectIdentifierNonMinimal);
    }
    let len = input
        .iter()
        .position(|byte| byte & 0x80 == 0)
        .map(|last| last + 1)
        .ok_or(Error::ObjectIdentifierIncompleteEncoding)?;
    let septets = &input[..len];

    if len <= MAX_SMALL_SEPTETS {
        let value = septets
            .iter()
            .fold(0u64, |value, byte| (value << 7) | u64::from(byte & 0x7f));
        return Ok((Arc::Small(value), len));
    }

    let digits: Vec<u8> = septets.iter().map(|byte| byte & 0x7f).collect();
    let value =
        BigUint::from_radix_be(&digits, 128).ok_or(Error::ObjectIdentifierIncompleteEncoding)?;
    Ok((Arc::Big(value), len))
}

/// The first sub-identifier packs two arcs as `arc0 * 40 + arc1`. Values of
/// 80 and above all belong to arc 2.
fn write_first_arcs(text: &mut String, arc: Arc) {
    let (first, second) = match arc {
        Arc::Small(value) if value < 40 => (0, Arc::Small(value)),
        Arc::Small(value) if value < 80 => (1, Arc::Small(value - 40)),
        Arc::Small(value) => (2, Arc::Small(value - 80)),
        Arc::Big(value) => {
            let rest = value - 80u32;
            match rest.to_u64() {
                Some(small) => (2, Arc::Small(small)),
                None => (2, Arc::Big(rest)),
            }
        }
    };
    text.push_str(&format!("{}.{}", first, second));
}

/// Reads an OBJECT IDENTIFIER and returns it in dotted decimal form.
pub fn read_object_identifier(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(String, usize)> {
    let (content, consumed) = primitive_content(
        input,
        rules,
        tag.unwrap_or(Tag::OBJECT_IDENTIFIER),
        UniversalTagNumber::ObjectIdentifier,
    )?;
    Ok((decode_content(content)?, consumed))
}
