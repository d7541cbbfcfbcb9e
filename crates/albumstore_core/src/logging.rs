//! Logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, writing to stderr
//!   or to rotating files in a log directory.
//!
//! # Invariants
//! - Repeating `init_logging` with the same level and destination is a no-op.
//! - Switching level or destination after start is rejected, never applied.
//! - Core log lines are `key=value` metadata; titles and artists stay out.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "albumstore";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    destination: LogDestination,
    _handle: LoggerHandle,
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    /// Rotating `albumstore*.log` files in an absolute directory.
    Directory(PathBuf),
}

impl LogDestination {
    /// Maps an optional configured directory to a destination.
    pub fn from_config(log_dir: Option<&Path>) -> Result<Self, String> {
        match log_dir {
            None => Ok(Self::Stderr),
            Some(dir) if dir.as_os_str().is_empty() => Ok(Self::Stderr),
            Some(dir) if dir.is_absolute() => Ok(Self::Directory(dir.to_path_buf())),
            Some(dir) => Err(format!(
                "log_dir must be an absolute path, got `{}`",
                dir.display()
            )),
        }
    }
}

impl Display for LogDestination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => write!(f, "stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Starts logging at `level` towards `log_dir`, or stderr when `None`.
///
/// # Errors
/// - `level` is not one of `off|error|warn|info|debug|trace`.
/// - `log_dir` is relative or cannot be created.
/// - Logging is already active with another level or destination.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<(), String> {
    let level = parse_level(level)?;
    let destination = LogDestination::from_config(log_dir)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &destination))?;

    if active.level != level || active.destination != destination {
        return Err(format!(
            "logging already active as level={} destination={}; cannot switch to level={} destination={}",
            active.level, active.destination, level, destination
        ));
    }
    Ok(())
}

/// Returns the default log level for current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unsupported log level `{}`", level.trim()))
}

fn start_logger(
    level: LevelFilter,
    destination: &LogDestination,
) -> Result<ActiveLogger, String> {
    let spec = level.to_string().to_ascii_lowercase();
    let logger = Logger::try_with_str(&spec)
        .map_err(|err| format!("invalid log level `{spec}`: {err}"))?;

    let handle = match destination {
        LogDestination::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format)
            .start(),
        LogDestination::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
        }
    }
    .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=logging_init module=core status=ok level={} destination={} version={}",
        level,
        destination,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        destination: destination.clone(),
        _handle: handle,
    })
}

#[cfg(test)]
mod tests {
    use super::{init_logging, parse_level, LogDestination};
    use log::LevelFilter;
    use std::path::{Path, PathBuf};

    #[test]
    fn parse_level_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_level("verbose").unwrap_err().contains("verbose"));
    }

    #[test]
    fn destination_requires_absolute_directory() {
        assert_eq!(
            LogDestination::from_config(None).unwrap(),
            LogDestination::Stderr
        );
        assert_eq!(
            LogDestination::from_config(Some(Path::new(""))).unwrap(),
            LogDestination::Stderr
        );
        assert!(LogDestination::from_config(Some(Path::new("logs/dev")))
            .unwrap_err()
            .contains("absolute"));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_switching() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir: PathBuf = dir.path().join("logs");

        init_logging("info", Some(log_dir.as_path())).unwrap();
        init_logging("INFO", Some(log_dir.as_path())).unwrap();
        assert!(log_dir.is_dir());

        let level_err = init_logging("debug", Some(log_dir.as_path())).unwrap_err();
        assert!(level_err.contains("cannot switch"));

        let destination_err = init_logging("info", None).unwrap_err();
        assert!(destination_err.contains("destination=stderr"));
    }
}
