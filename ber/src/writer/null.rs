use super::Writer;
use crate::error::Result;
use crate::tag::{Tag, UniversalTagNumber};

impl Writer {
    pub fn write_null(&mut self, tag: Option<Tag>) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Null)?;
        self.write_primitive(tag, &[]);
        Ok(())
    }
}
