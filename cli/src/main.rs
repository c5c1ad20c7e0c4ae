use clap::{Parser, Subcommand};

mod check;
mod convert;
mod dump;
mod error;
mod format;
mod hexdump;
mod logging;
mod output;
mod utils;

use error::Result;
use output::LogLevel;

#[derive(Parser)]
#[command(name = "x690")]
#[command(about = "Inspect, validate and transcode BER, CER and DER encodings", long_about = None)]
struct Cli {
    /// Log verbosity. Logs are written to stderr
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode and display the value tree
    Dump {
        #[command(flatten)]
        config: dump::Config,
    },
    /// Validate that the input is well formed under the given rules
    Check {
        #[command(flatten)]
        config: check::Config,
    },
    /// Re-encode the input under different rules
    Convert {
        #[command(flatten)]
        config: convert::Config,
    },
    /// Display the raw input as a hexadecimal dump
    Hexdump {
        #[command(flatten)]
        config: hexdump::Config,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _handle = logging::init_logs(cli.log_level.into())?;

    match cli.command {
        Commands::Dump { config } => {
            dump::execute(config)?;
        }
        Commands::Check { config } => {
            check::execute(config)?;
        }
        Commands::Convert { config } => {
            convert::execute(config)?;
        }
        Commands::Hexdump { config } => {
            hexdump::execute(config)?;
        }
    }

    Ok(())
}
