use std::fs;
use std::io::{self, Read};

use asn1::ASN1Object;
use ber::{DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX, EncodingRules, ReaderOptions};
use clap::Args;
use log::debug;

use crate::error::{Error, Result};

/// Input selection shared by every command.
#[derive(Args)]
pub(crate) struct InputArgs {
    /// Path to the encoded file. If not specified, reads from stdin
    pub(crate) file: Option<String>,

    /// Treat the input as whitespace separated hexadecimal text
    #[arg(long)]
    pub(crate) hex_input: bool,
}

impl InputArgs {
    /// Reads the raw input bytes, decoding hex text when requested.
    pub(crate) fn load(&self) -> Result<Vec<u8>> {
        let bytes = read_input(self.file.as_deref())?;
        if self.hex_input {
            return parse_hex_input(&bytes);
        }
        Ok(bytes)
    }
}

/// Reader settings shared by the commands that decode.
#[derive(Args)]
pub(crate) struct ReaderArgs {
    /// Latest year a two digit UTCTime year maps to
    #[arg(long, default_value_t = DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX)]
    pub(crate) utc_pivot: u16,

    /// Accept SET OF members in any order under CER and DER
    #[arg(long)]
    pub(crate) skip_set_order: bool,
}

impl ReaderArgs {
    pub(crate) fn options(&self) -> Result<ReaderOptions> {
        Ok(ReaderOptions::default()
            .with_utc_pivot(self.utc_pivot)?
            .skip_set_sort_order_verification(self.skip_set_order))
    }

    pub(crate) fn decode(&self, bytes: &[u8], rules: EncodingRules) -> Result<ASN1Object> {
        let obj = ASN1Object::decode(bytes, rules, self.options()?)?;
        debug!(
            "decoded {} top-level values from {} bytes under {}",
            obj.elements().len(),
            bytes.len(),
            rules
        );
        Ok(obj)
    }
}

/// Read input from a file or stdin
///
/// If `file` is `Some`, reads from the specified file path.
/// If `file` is `None`, reads from stdin.
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    match file {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Decodes hexadecimal text. Whitespace may separate digits anywhere.
pub(crate) fn parse_hex_input(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(Error::InvalidInput(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }

    let bytes = digits
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let high = hex_value(pair[0]);
            let low = hex_value(pair[1]);
            match (high, low) {
                (Some(high), Some(low)) => Ok((high << 4) | low),
                _ => Err(Error::InvalidInput(format!(
                    "invalid hex digits '{}' at byte {}",
                    String::from_utf8_lossy(pair),
                    i
                ))),
            }
        })
        .collect::<Result<Vec<u8>>>()?;
    debug!("decoded {} bytes of hex input", bytes.len());
    Ok(bytes)
}

fn hex_value(digit: u8) -> Option<u8> {
    char::from(digit).to_digit(16).map(|value| value as u8)
}

/// Format binary data as hexadecimal dump
///
/// Returns a string formatted in hexdump style (similar to `xxd` command):
/// - 16 bytes per line
/// - Offset in hexadecimal
/// - Hex bytes with space separator
/// - ASCII representation on the right
pub(crate) fn format_hex_dump(data: &[u8]) -> String {
    const BYTES_PER_LINE: usize = 16;
    let mut output = String::new();

    for (offset, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        output.push_str(&format!("{:08x}  ", offset * BYTES_PER_LINE));

        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => output.push_str(&format!("{:02x} ", byte)),
                // Padding for incomplete lines
                None => output.push_str("   "),
            }
            if i == 7 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
