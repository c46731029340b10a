//! log4rs setup.
//!
//! Builders log through the `log` facade. Dropped input (unmapped fields,
//! invalid directions, substituted defaults) goes to the `autoquery::dropped`
//! target, which `configure_logging` routes to its own `dropped.log`.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::errors::QueryError;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Initializes logging from a log4rs YAML file.
///
/// # Errors
/// Returns an error if the file cannot be loaded.
pub fn init_file(path: &Path) -> Result<(), QueryError> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())
        .map_err(|e| QueryError::Logger(e.to_string()))
}

/// Configure logging globally for the process.
/// - dir: base directory for logs; if None, current directory.
/// - level: error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// A logger already installed for the process is left in place.
///
/// # Errors
/// Returns an error if an appender cannot be created.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
) -> Result<(), QueryError> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base).map_err(|e| QueryError::Io(e.to_string()))?;
    let keep = retention.unwrap_or(7);
    let lvl = parse_level(level);
    let app = rolling_appender(&base, "app", keep)?;
    let dropped = rolling_appender(&base, "dropped", keep)?;
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(app)))
        .appender(Appender::builder().build("dropped", Box::new(dropped)))
        .logger(
            Logger::builder()
                .appender("dropped")
                .additive(false)
                .build("autoquery::dropped", lvl),
        )
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| QueryError::Logger(e.to_string()))?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Configure logging from environment variables if present:
/// - AUTOQUERY_LOG_DIR
/// - AUTOQUERY_LOG_LEVEL
/// - AUTOQUERY_LOG_RETENTION
///
/// # Errors
/// Returns an error if an appender cannot be created.
pub fn configure_from_env() -> Result<(), QueryError> {
    let dir = std::env::var("AUTOQUERY_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("AUTOQUERY_LOG_LEVEL").ok();
    let retention =
        std::env::var("AUTOQUERY_LOG_RETENTION").ok().and_then(|s| s.parse::<u32>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling_appender(base: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, QueryError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{name}.{{}}.log")).display()), keep)
        .map_err(|e| QueryError::Logger(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))
        .map_err(|e| QueryError::Io(e.to_string()))
}
