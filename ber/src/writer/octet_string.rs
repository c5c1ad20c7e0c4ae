use log::trace;

use super::Writer;
use crate::error::Result;
use crate::rules::CER_SEGMENT_LEN;
use crate::tag::{Tag, UniversalTagNumber};

impl Writer {
    /// Writes string content under `tag`. CER splits content longer than a
    /// segment into a constructed encoding of OCTET STRING segments.
    pub(crate) fn write_octets(&mut self, tag: Tag, content: &[u8]) {
        if !self.rules.is_cer() || content.len() <= CER_SEGMENT_LEN {
            self.write_primitive(tag, content);
            return;
        }

        trace!("{} of {} octets split into segments", tag, content.len());
        self.write_tag(tag.as_constructed());
        self.write_length(None);
        for segment in content.chunks(CER_SEGMENT_LEN) {
            self.write_primitive(Tag::OCTET_STRING, segment);
        }
        self.write_end_of_contents();
    }

    pub fn write_octet_string(&mut self, value: &[u8], tag: Option<Tag>) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::OctetString)?;
        self.write_octets(tag, value);
        Ok(())
    }
}
