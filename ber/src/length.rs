//! X.690 length octets.
//!
//! A decoded length is `Some(n)` for the definite forms and `None` for the
//! indefinite form, which is terminated by an end-of-contents marker.

use crate::error::{Error, Result};
use crate::rules::EncodingRules;

pub const INDEFINITE: u8 = 0x80;
const RESERVED: u8 = 0xFF;
const MAX_LENGTH_OCTETS: usize = 4;

/// Decodes the length octets at the front of `input`, returning the length
/// and the number of octets read.
pub fn decode(input: &[u8], rules: EncodingRules) -> Result<(Option<usize>, usize)> {
    let first = *input.first().ok_or(Error::Incomplete)?;

    if first < INDEFINITE {
        return Ok((Some(usize::from(first)), 1));
    }
    if first == INDEFINITE {
        if !rules.allows_indefinite_length() {
            return Err(Error::IndefiniteLengthProhibited);
        }
        return Ok((None, 1));
    }
    if first == RESERVED {
        return Err(Error::LengthReserved);
    }

    let count = usize::from(first & 0x7F);
    let octets = input.get(1..=count).ok_or(Error::Incomplete)?;
    if rules.is_canonical() && count > MAX_LENGTH_OCTETS {
        return Err(Error::LengthTooLarge);
    }

    let mut value: u64 = 0;
    for (i, &octet) in octets.iter().enumerate() {
        if value == 0 {
            if rules.is_canonical() && octet == 0 {
                return Err(Error::LengthNonMinimal(rules));
            }
            // BER tolerates leading zeros as long as the significant part fits.
            if octet != 0 && count - i > MAX_LENGTH_OCTETS {
                return Err(Error::LengthTooLarge);
            }
        }
        value = (value << 8) | u64::from(octet);
    }

    if value > u64::from(u32::MAX) {
        return Err(Error::LengthTooLarge);
    }
    if rules.is_canonical() && value < u64::from(INDEFINITE) {
        return Err(Error::LengthNonMinimal(rules));
    }

    let length = usize::try_from(value).map_err(|_| Error::LengthTooLarge)?;
    Ok((Some(length), count + 1))
}

/// Number of octets the minimal definite encoding of `length` takes.
pub fn encoded_len(length: usize) -> usize {
    if length < usize::from(INDEFINITE) {
        1
    } else {
        1 + significant_octets(length)
    }
}

/// Appends the minimal encoding of `length`; `None` writes the indefinite marker.
pub fn encode_into(length: Option<usize>, out: &mut Vec<u8>) {
    match length {
        None => out.push(INDEFINITE),
        Some(length) if length < usize::from(INDEFINITE) => out.push(length as u8),
        Some(length) => {
            let count = significant_octets(length);
            out.push(INDEFINITE | count as u8);
            let bytes = length.to_be_bytes();
            out.extend_from_slice(&bytes[bytes.len() - count..]);
        }
    }
}

/// Writes the minimal definite encoding of `length` into `dest`, which must
/// be exactly [`encoded_len`] bytes long.
pub(crate) fn encode_to_slice(length: usize, dest: &mut [u8]) {
    if length < usize::from(INDEFINITE) {
        dest[0] = length as u8;
        return;
    }
    let count = significant_octets(length);
    let bytes = length.to_be_bytes();
    dest[0] = INDEFINITE | count as u8;
    dest[1..=count].copy_from_slice(&bytes[bytes.len() - count..]);
}

fn significant_octets(length: usize) -> usize {
    let bits = usize::BITS - length.leading_zeros();
    (bits as usize).div_ceil(8).max(1)
}
