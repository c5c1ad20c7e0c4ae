use super::primitive_content;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Reads a BOOLEAN. Only BER accepts nonzero values other than `0xFF`.
pub fn read_boolean(input: &[u8], rules: EncodingRules, tag: Option<Tag>) -> Result<(bool, usize)> {
    let (content, consumed) = primitive_content(
        input,
        rules,
        tag.unwrap_or(Tag::BOOLEAN),
        UniversalTagNumber::Boolean,
    )?;

    let [value] = content else {
        return Err(Error::BooleanInvalidLength(content.len()));
    };

    match *value {
        0x00 => Ok((false, consumed)),
        0xff => Ok((true, consumed)),
        _ if rules.is_ber() => Ok((true, consumed)),
        other => Err(Error::BooleanNonCanonical(other)),
    }
}
