use num_bigint::BigUint;
use num_traits::Zero;

use super::Writer;
use crate::error::{Error, Result};
use crate::tag::{Tag, UniversalTagNumber};

fn parse_arc(text: &str) -> Result<BigUint> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::InvalidArgument("object identifier arcs must be decimal"));
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err(Error::InvalidArgument("object identifier arc has a leading zero"));
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or(Error::InvalidArgument("object identifier arcs must be decimal"))
}

fn push_sub_identifier(out: &mut Vec<u8>, value: &BigUint) {
    if value.is_zero() {
        out.push(0);
        return;
    }
    let septets = value.to_radix_be(128);
    let last = septets.len() - 1;
    out.extend(
        septets
            .iter()
            .enumerate()
            .map(|(i, septet)| if i == last { *septet } else { septet | 0x80 }),
    );
}

/// Encodes dotted decimal text as OBJECT IDENTIFIER content octets.
pub(crate) fn encode_content(text: &str) -> Result<Vec<u8>> {
    let arcs = text.split('.').map(parse_arc).collect::<Result<Vec<_>>>()?;
    let [first, second, rest @ ..] = arcs.as_slice() else {
        return Err(Error::InvalidArgument("object identifier needs at least two arcs"));
    };

    let forty = BigUint::from(40u32);
    if *first > BigUint::from(2u32) {
        return Err(Error::InvalidArgument("first object identifier arc must be 0, 1 or 2"));
    }
    if *first < BigUint::from(2u32) && *second >= forty {
        return Err(Error::InvalidArgument("second object identifier arc must be below 40"));
    }

    let mut content = Vec::new();
    push_sub_identifier(&mut content, &(first * &forty + second));
    for arc in rest {
        push_sub_identifier(&mut content, arc);
    }
    Ok(content)
}

impl Writer {
    /// Writes an OBJECT IDENTIFIER given in dotted decimal form.
    pub fn write_object_identifier(&mut self, value: &str, tag: Option<Tag>) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::ObjectIdentifier)?;
        let content = encode_content(value)?;
        self.write_primitive(tag, &content);
        Ok(())
    }
}
