//! JSON-lines log file for generation runs.
//!
//! Each event is one JSON object per line so a run's analyze, research,
//! synthesize and normalize stages can be grepped or loaded afterwards.

use crate::logging::config::LoggingConfig;
use crate::Result;
use anyhow::{anyhow, Context};
use dirs_next::home_dir;
use std::fs::create_dir_all;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self as tracing_fmt, format, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;

const LOG_FILE_PREFIX: &str = "flowsmith";
const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_FILE_NAME: &str = "flowsmith.log";

const STATE_DIR: &str = ".flowsmith";
const LOGS_DIR: &str = "logs";

pub type FileFmtLayer<S> =
    tracing_fmt::Layer<S, format::JsonFields, format::Format<format::Json>, BoxMakeWriter>;

pub type FileLayerStack<S> = tracing_subscriber::layer::Layered<FileFmtLayer<S>, S>;

/// Where the log directory is anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogLocation {
    /// `<workspace>/.flowsmith/logs` or a relative override under the workspace.
    Workspace { root: PathBuf, dir: PathBuf },
    /// `~/.flowsmith/logs` or a relative override under home, used without a workspace.
    Home { home: PathBuf, dir: PathBuf },
    /// Absolute `log_dir` override, taken as is.
    Absolute(PathBuf),
}

impl LogLocation {
    fn resolve(config: &LoggingConfig, workspace_root: Option<&Path>) -> Result<Self> {
        let relative = match &config.log_dir {
            Some(custom) if custom.is_absolute() => {
                return Ok(LogLocation::Absolute(clean_path(custom)))
            }
            Some(custom) => custom.clone(),
            None => Path::new(STATE_DIR).join(LOGS_DIR),
        };

        match workspace_root {
            Some(root) => {
                let root = if root.is_relative() {
                    std::env::current_dir()
                        .context("failed to resolve current directory")?
                        .join(root)
                } else {
                    root.to_path_buf()
                };
                let root = clean_path(&root);
                Ok(LogLocation::Workspace {
                    dir: clean_path(&root.join(relative)),
                    root,
                })
            }
            None => {
                let home = home_dir().ok_or_else(|| anyhow!("$HOME directory unavailable"))?;
                let home = clean_path(&home);
                Ok(LogLocation::Home {
                    dir: clean_path(&home.join(relative)),
                    home,
                })
            }
        }
    }

    /// Relative overrides must stay under their anchor.
    fn checked_dir(self) -> Result<PathBuf> {
        match self {
            LogLocation::Absolute(dir) => Ok(dir),
            LogLocation::Workspace { root, dir } => {
                if dir.starts_with(&root) {
                    Ok(dir)
                } else {
                    Err(anyhow!(
                        "logging.log_dir resolves outside workspace {}",
                        root.display()
                    ))
                }
            }
            LogLocation::Home { home, dir } => {
                if dir.starts_with(&home) {
                    Ok(dir)
                } else {
                    Err(anyhow!("logging.log_dir resolves outside home {}", home.display()))
                }
            }
        }
    }
}

/// Lexically collapse `.` and `..` so paths that do not exist yet are
/// still checked against their anchor.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push(component);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Full path of the log file for this configuration.
pub fn log_file_path(config: &LoggingConfig, workspace_root: Option<&Path>) -> Result<PathBuf> {
    let dir = LogLocation::resolve(config, workspace_root)?.checked_dir()?;
    Ok(dir.join(LOG_FILE_NAME))
}

/// Build the JSON file layer. A disabled layer writes to `io::sink` and
/// creates nothing on disk.
pub fn file_layer<S>(
    log_file: &Path,
    enabled: bool,
) -> Result<(FileFmtLayer<S>, Option<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !enabled {
        return Ok((json_layer(BoxMakeWriter::new(io::sink)), None));
    }

    let dir = log_file.parent().ok_or_else(|| {
        anyhow!("log file path {} has no parent directory", log_file.display())
    })?;
    create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let writer = BoxMakeWriter::new(move || non_blocking.clone());
    Ok((json_layer(writer), Some(guard)))
}

fn json_layer<S>(writer: BoxMakeWriter) -> FileFmtLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
}
