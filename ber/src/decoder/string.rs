use super::octet_string::{read_string_bytes, try_read_primitive_string};
use crate::charset::encoding_for_tag;
use crate::error::Result;
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Reads a character string of the type named by `universal` and decodes it
/// with that type's character encoding.
pub fn read_character_string(
    input: &[u8],
    rules: EncodingRules,
    universal: UniversalTagNumber,
    tag: Option<Tag>,
) -> Result<(String, usize)> {
    let charset = encoding_for_tag(universal)?;
    let expected = tag.unwrap_or(Tag::universal(universal, false));
    let (bytes, consumed) = read_string_bytes(input, rules, expected, universal)?;
    Ok((charset.decode(&bytes)?, consumed))
}

/// Returns the undecoded content of a primitive character string, or
/// `Ok(None)` for the constructed form.
pub fn try_read_primitive_character_string_bytes(
    input: &[u8],
    rules: EncodingRules,
    universal: UniversalTagNumber,
    tag: Option<Tag>,
) -> Result<Option<(&[u8], usize)>> {
    encoding_for_tag(universal)?;
    let expected = tag.unwrap_or(Tag::universal(universal, false));
    try_read_primitive_string(input, rules, expected, universal)
}
