use super::primitive_content;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Reads a NULL and returns the bytes consumed.
pub fn read_null(input: &[u8], rules: EncodingRules, tag: Option<Tag>) -> Result<usize> {
    let (content, consumed) =
        primitive_content(input, rules, tag.unwrap_or(Tag::NULL), UniversalTagNumber::Null)?;
    if !content.is_empty() {
        return Err(Error::NullNotEmpty(content.len()));
    }
    Ok(consumed)
}
