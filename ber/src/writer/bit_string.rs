use log::trace;

use super::Writer;
use crate::error::{Error, Result};
use crate::rules::CER_SEGMENT_LEN;
use crate::tag::{Tag, UniversalTagNumber};

/// Data octets in a full CER BIT STRING segment, after the unused bit count.
const CER_BIT_SEGMENT_DATA_LEN: usize = CER_SEGMENT_LEN - 1;

impl Writer {
    fn write_bit_segment(&mut self, tag: Tag, data: &[u8], unused_bits: u8) {
        self.write_tag(tag.as_primitive());
        self.write_length(Some(data.len() + 1));
        self.buffer.push(unused_bits);
        self.buffer.extend_from_slice(data);
    }

    /// Writes a BIT STRING. The low `unused_bits` bits of the final data
    /// octet must be zero.
    pub fn write_bit_string(&mut self, data: &[u8], unused_bits: u8, tag: Option<Tag>) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::BitString)?;

        if unused_bits > 7 {
            return Err(Error::InvalidArgument("unused bit count must be 0-7"));
        }
        match data.last() {
            None if unused_bits != 0 => {
                return Err(Error::InvalidArgument("unused bits require data"));
            }
            Some(last) if last & ((1u8 << unused_bits) - 1) != 0 => {
                return Err(Error::InvalidArgument("unused bits must be zero"));
            }
            _ => {}
        }

        if !self.rules.is_cer() || data.len() <= CER_BIT_SEGMENT_DATA_LEN {
            self.write_bit_segment(tag, data, unused_bits);
            return Ok(());
        }

        trace!("{} of {} octets split into segments", tag, data.len());
        self.write_tag(tag.as_constructed());
        self.write_length(None);
        let mut segments = data.chunks(CER_BIT_SEGMENT_DATA_LEN).peekable();
        while let Some(segment) = segments.next() {
            let unused = if segments.peek().is_none() { unused_bits } else { 0 };
            self.write_bit_segment(Tag::BIT_STRING, segment, unused);
        }
        self.write_end_of_contents();
        Ok(())
    }

    /// Writes `flags` as a named bit list, where bit 0 of `flags` is the first
    /// named bit. Trailing zero bits are dropped.
    pub fn write_named_bit_list(&mut self, flags: u64, tag: Option<Tag>) -> Result<()> {
        let mut data: Vec<u8> = flags
            .to_le_bytes()
            .iter()
            .map(|byte| byte.reverse_bits())
            .collect();
        while data.last() == Some(&0) {
            data.pop();
        }
        let unused_bits = data.last().map_or(0, |last| last.trailing_zeros() as u8);
        self.write_bit_string(&data, unused_bits, tag)
    }
}
