use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LoggerConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::Result;

/// Installs a stderr logger so that log lines never mix with command output.
pub(crate) fn init_logs(level: LevelFilter) -> Result<Handle> {
    let config = build_logger_config(level)?;
    Ok(log4rs::init_config(config)?)
}

pub(crate) fn build_logger_config(
    level: LevelFilter,
) -> std::result::Result<LoggerConfig, log4rs::config::runtime::ConfigErrors> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
        .build();

    LoggerConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
}
