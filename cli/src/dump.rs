use clap::Args;

use crate::error::Result;
use crate::format::format_asn1;
use crate::output::{OutputFormat, RulesArg};
use crate::utils::{InputArgs, ReaderArgs};

#[derive(Args)]
pub(crate) struct Config {
    #[command(flatten)]
    input: InputArgs,

    /// Encoding rules the input must satisfy
    #[arg(long, value_enum, default_value = "der")]
    rules: RulesArg,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(flatten)]
    reader: ReaderArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input_bytes = config.input.load()?;
    let obj = config.reader.decode(&input_bytes, config.rules.into())?;

    match config.output {
        OutputFormat::Text => print!("{}", format_asn1(&obj)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&obj)?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&obj)?),
    }

    Ok(())
}
