use clap::Args;

use crate::error::Result;
use crate::utils::{InputArgs, format_hex_dump};

#[derive(Args)]
pub(crate) struct Config {
    #[command(flatten)]
    input: InputArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input_bytes = config.input.load()?;
    print!("{}", format_hex_dump(&input_bytes));
    Ok(())
}
