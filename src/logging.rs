//! Tracing setup for the `blinds-admin` binary.
//!
//! Records go to stderr unless a log directory is given, in which case they
//! go to a rolling file. The appender prunes files past the retention count
//! whenever it rolls over.

use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_PREFIX: &str = "blinds-admin";
pub const KEPT_LOG_FILES: usize = 7;

/// How often a new log file is started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RotationPeriod {
    Hourly,
    #[default]
    Daily,
    /// One file that grows forever.
    Never,
}

impl RotationPeriod {
    fn rotation(self) -> Rotation {
        match self {
            RotationPeriod::Hourly => Rotation::HOURLY,
            RotationPeriod::Daily => Rotation::DAILY,
            RotationPeriod::Never => Rotation::NEVER,
        }
    }
}

/// Where log records end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Files {
        dir: PathBuf,
        rotation: RotationPeriod,
        keep: usize,
    },
}

impl LogTarget {
    /// Maps the `--log-dir` and `--log-rotation` arguments to a target.
    pub fn from_args(log_dir: Option<&str>, rotation: RotationPeriod) -> Self {
        match log_dir {
            Some(dir) => LogTarget::Files {
                dir: PathBuf::from(dir),
                rotation,
                keep: KEPT_LOG_FILES,
            },
            None => LogTarget::Stderr,
        }
    }

    /// Installs the global subscriber for this target.
    ///
    /// The filter comes from `RUST_LOG`. File records are written by a
    /// background worker, so the returned guard must live until exit or the
    /// tail of the log is lost.
    pub fn install(&self) -> std::io::Result<LogGuard> {
        match self {
            LogTarget::Stderr => {
                tracing_subscriber::fmt()
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_writer(std::io::stderr)
                    .try_init()
                    .map_err(std::io::Error::other)?;
                Ok(LogGuard { _guard: None })
            }
            LogTarget::Files {
                dir,
                rotation,
                keep,
            } => {
                let (writer, guard) =
                    tracing_appender::non_blocking(file_appender(dir, *rotation, *keep)?);
                tracing_subscriber::registry()
                    .with(EnvFilter::from_default_env())
                    .with(
                        Layer::default()
                            .with_writer(writer)
                            .with_ansi(false)
                            .with_file(true)
                            .with_line_number(true),
                    )
                    .try_init()
                    .map_err(std::io::Error::other)?;
                Ok(LogGuard {
                    _guard: Some(guard),
                })
            }
        }
    }
}

/// Flushes pending file records when dropped.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

fn file_appender(
    dir: &Path,
    rotation: RotationPeriod,
    keep: usize,
) -> std::io::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(rotation.rotation())
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(keep)
        .build(dir)
        .map_err(std::io::Error::other)
}
