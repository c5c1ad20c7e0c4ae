use clap::Args;

use crate::error::Result;
use crate::output::RulesArg;
use crate::utils::{InputArgs, ReaderArgs};

#[derive(Args)]
pub(crate) struct Config {
    #[command(flatten)]
    input: InputArgs,

    /// Encoding rules the input must satisfy
    #[arg(long, value_enum, default_value = "der")]
    rules: RulesArg,

    #[command(flatten)]
    reader: ReaderArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input_bytes = config.input.load()?;
    let obj = config.reader.decode(&input_bytes, config.rules.into())?;
    println!(
        "OK ({} values, {} bytes)",
        obj.elements().len(),
        input_bytes.len()
    );
    Ok(())
}
