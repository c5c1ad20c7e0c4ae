//! Character encodings of the ASN.1 restricted string types.

use log::debug;

use crate::error::{Error, Result};
use crate::tag::UniversalTagNumber;

/// The character encoding a string type is transferred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    /// Digits and space.
    Numeric,
    Printable,
    Ia5,
    Visible,
    /// Decoded as UTF-8 with a Latin-1 fallback, always encoded as UTF-8.
    T61,
    /// UCS-2 big-endian.
    Bmp,
    /// UTF-32 big-endian.
    Universal,
}

/// Looks up the encoding of a character string type.
pub fn encoding_for_tag(number: UniversalTagNumber) -> Result<Charset> {
    let charset = match number {
        UniversalTagNumber::UTF8String => Charset::Utf8,
        UniversalTagNumber::NumericString => Charset::Numeric,
        UniversalTagNumber::PrintableString => Charset::Printable,
        UniversalTagNumber::IA5String => Charset::Ia5,
        UniversalTagNumber::VisibleString => Charset::Visible,
        UniversalTagNumber::T61String => Charset::T61,
        UniversalTagNumber::BMPString => Charset::Bmp,
        UniversalTagNumber::UniversalString => Charset::Universal,
        other => return Err(Error::UnsupportedStringType(other)),
    };
    Ok(charset)
}

fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/' | ':' | '=' | '?'
        )
}

impl Charset {
    pub fn tag_number(self) -> UniversalTagNumber {
        match self {
            Charset::Utf8 => UniversalTagNumber::UTF8String,
            Charset::Numeric => UniversalTagNumber::NumericString,
            Charset::Printable => UniversalTagNumber::PrintableString,
            Charset::Ia5 => UniversalTagNumber::IA5String,
            Charset::Visible => UniversalTagNumber::VisibleString,
            Charset::T61 => UniversalTagNumber::T61String,
            Charset::Bmp => UniversalTagNumber::BMPString,
            Charset::Universal => UniversalTagNumber::UniversalString,
        }
    }

    /// Returns `true` if the character set can represent `c`.
    pub fn allows(self, c: char) -> bool {
        match self {
            Charset::Utf8 | Charset::T61 | Charset::Universal => true,
            Charset::Numeric => c.is_ascii_digit() || c == ' ',
            Charset::Printable => is_printable(c),
            Charset::Ia5 => c.is_ascii(),
            Charset::Visible => (' '..='~').contains(&c),
            Charset::Bmp => u32::from(c) <= 0xffff,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        let invalid = Error::CharacterStringInvalid(self.tag_number());
        let text = match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| invalid.clone())?,
            Charset::T61 => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
            },
            Charset::Numeric | Charset::Printable | Charset::Ia5 | Charset::Visible => {
                bytes.iter().map(|&byte| char::from(byte)).collect()
            }
            Charset::Bmp => {
                if bytes.len() % 2 != 0 {
                    return Err(invalid);
                }
                bytes
                    .chunks_exact(2)
                    .map(|pair| char::from_u32(u32::from(u16::from_be_bytes([pair[0], pair[1]]))))
                    .collect::<Option<String>>()
                    .ok_or(invalid.clone())?
            }
            Charset::Universal => {
                if bytes.len() % 4 != 0 {
                    return Err(invalid);
                }
                bytes
                    .chunks_exact(4)
                    .map(|quad| char::from_u32(u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]])))
                    .collect::<Option<String>>()
                    .ok_or(invalid.clone())?
            }
        };

        if !text.chars().all(|c| self.allows(c)) {
            return Err(invalid);
        }
        Ok(text)
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        if let Some(c) = text.chars().find(|&c| !self.allows(c)) {
            debug!("{:?} cannot represent {:?}", self.tag_number(), c);
            return Err(Error::CharacterStringInvalid(self.tag_number()));
        }

        let bytes = match self {
            Charset::Utf8 | Charset::T61 => text.as_bytes().to_vec(),
            Charset::Numeric | Charset::Printable | Charset::Ia5 | Charset::Visible => {
                text.bytes().collect()
            }
            Charset::Bmp => text
                .chars()
                .flat_map(|c| (u32::from(c) as u16).to_be_bytes())
                .collect(),
            Charset::Universal => text
                .chars()
                .flat_map(|c| u32::from(c).to_be_bytes())
                .collect(),
        };
        Ok(bytes)
    }
}
