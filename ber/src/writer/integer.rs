use num_bigint::BigInt;

use super::Writer;
use crate::decoder::integer::check_minimal;
use crate::error::{Error, Result};
use crate::tag::{Tag, UniversalTagNumber};

/// Drops leading octets that only repeat the sign bit.
fn minimal_signed(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xff => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    &bytes[start..]
}

impl Writer {
    fn write_integer_content(
        &mut self,
        tag: Option<Tag>,
        universal: UniversalTagNumber,
        content: &[u8],
    ) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, universal)?;
        self.write_primitive(tag, content);
        Ok(())
    }

    pub fn write_integer(&mut self, value: i64, tag: Option<Tag>) -> Result<()> {
        let bytes = value.to_be_bytes();
        self.write_integer_content(tag, UniversalTagNumber::Integer, minimal_signed(&bytes))
    }

    pub fn write_integer_u64(&mut self, value: u64, tag: Option<Tag>) -> Result<()> {
        let mut bytes = [0u8; 9];
        bytes[1..].copy_from_slice(&value.to_be_bytes());
        self.write_integer_content(tag, UniversalTagNumber::Integer, minimal_signed(&bytes))
    }

    pub fn write_big_integer(&mut self, value: &BigInt, tag: Option<Tag>) -> Result<()> {
        let bytes = value.to_signed_bytes_be();
        self.write_integer_content(tag, UniversalTagNumber::Integer, &bytes)
    }

    /// Writes an INTEGER from its two's complement content octets, which must
    /// be minimal.
    pub fn write_integer_bytes(&mut self, value: &[u8], tag: Option<Tag>) -> Result<()> {
        check_minimal(value).map_err(|_| Error::InvalidArgument("integer content is not minimal"))?;
        self.write_integer_content(tag, UniversalTagNumber::Integer, value)
    }

    /// Writes a non-negative INTEGER from big-endian magnitude octets.
    pub fn write_integer_unsigned_bytes(&mut self, value: &[u8], tag: Option<Tag>) -> Result<()> {
        if value.is_empty() {
            return Err(Error::InvalidArgument("integer content is empty"));
        }
        let start = value
            .iter()
            .position(|&byte| byte != 0)
            .unwrap_or(value.len() - 1);
        let magnitude = &value[start..];

        let mut content = Vec::with_capacity(magnitude.len() + 1);
        if magnitude[0] & 0x80 != 0 {
            content.push(0x00);
        }
        content.extend_from_slice(magnitude);
        self.write_integer_content(tag, UniversalTagNumber::Integer, &content)
    }

    pub fn write_enumerated(&mut self, value: i64, tag: Option<Tag>) -> Result<()> {
        let bytes = value.to_be_bytes();
        self.write_integer_content(tag, UniversalTagNumber::Enumerated, minimal_signed(&bytes))
    }
}
