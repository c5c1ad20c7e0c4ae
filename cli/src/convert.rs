use std::fs;
use std::io::{self, Write};

use ber::EncodingRules;
use clap::Args;
use log::info;

use crate::error::Result;
use crate::output::RulesArg;
use crate::utils::{InputArgs, ReaderArgs, format_hex_dump};

#[derive(Args)]
pub(crate) struct Config {
    #[command(flatten)]
    input: InputArgs,

    /// Encoding rules of the input
    #[arg(long, value_enum, default_value = "ber")]
    from: RulesArg,

    /// Encoding rules to write
    #[arg(long, value_enum, default_value = "der")]
    to: RulesArg,

    /// Output as hexadecimal dump instead of binary
    #[arg(long)]
    hex: bool,

    /// Path to write the result to. If not specified, writes to stdout
    #[arg(long, short = 'o')]
    output: Option<String>,

    #[command(flatten)]
    reader: ReaderArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input_bytes = config.input.load()?;
    let from = EncodingRules::from(config.from);
    let to = EncodingRules::from(config.to);

    let obj = config.reader.decode(&input_bytes, from)?;
    let encoded = obj.encode_with_utc_pivot(to, config.reader.utc_pivot)?;
    info!(
        "converted {} bytes of {} into {} bytes of {}",
        input_bytes.len(),
        from,
        encoded.len(),
        to
    );

    let out = if config.hex {
        format_hex_dump(&encoded).into_bytes()
    } else {
        encoded
    };

    match config.output.as_deref() {
        Some(path) => fs::write(path, &out)?,
        None => io::stdout().write_all(&out)?,
    }

    Ok(())
}
