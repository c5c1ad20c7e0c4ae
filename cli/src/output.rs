use ber::EncodingRules;
use log::LevelFilter;

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented tree, one value per line
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum RulesArg {
    /// Basic Encoding Rules
    Ber,
    /// Canonical Encoding Rules
    Cer,
    /// Distinguished Encoding Rules
    Der,
}

impl From<RulesArg> for EncodingRules {
    fn from(value: RulesArg) -> Self {
        match value {
            RulesArg::Ber => EncodingRules::Ber,
            RulesArg::Cer => EncodingRules::Cer,
            RulesArg::Der => EncodingRules::Der,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
