use super::Writer;
use crate::charset::encoding_for_tag;
use crate::error::{Error, Result};
use crate::tag::{Tag, UniversalTagNumber};

impl Writer {
    /// Writes `value` as the character string type named by `universal`.
    pub fn write_character_string(
        &mut self,
        universal: UniversalTagNumber,
        value: &str,
        tag: Option<Tag>,
    ) -> Result<()> {
        self.check_writable()?;
        let charset = encoding_for_tag(universal)?;
        let tag = Writer::resolve_tag(tag, universal)?;
        let content = charset.encode(value).map_err(|_| {
            Error::InvalidArgument("string contains characters the type cannot represent")
        })?;
        self.write_octets(tag, &content);
        Ok(())
    }
}
