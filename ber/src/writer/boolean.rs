use super::Writer;
use crate::error::Result;
use crate::tag::{Tag, UniversalTagNumber};

impl Writer {
    pub fn write_boolean(&mut self, value: bool, tag: Option<Tag>) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Boolean)?;
        self.write_primitive(tag, &[if value { 0xff } else { 0x00 }]);
        Ok(())
    }
}
