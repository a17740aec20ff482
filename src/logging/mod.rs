pub mod config;
pub mod context;
pub mod layers;

pub use context::{detect_context, ExecutionContext};
pub use layers::console::ConsoleOutput;

use crate::cli::args::GlobalArgs;
use crate::cli::Command;
use crate::logging::config::LoggingConfig;
use crate::logging::layers::{console, file};
use crate::Result;
use anyhow::{anyhow, Context};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Guards that keep logging sinks active for the duration of the command.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    console_output: ConsoleOutput,
    log_file_path: PathBuf,
}

impl LoggingGuard {
    /// Returns the console output configuration used during initialization.
    pub fn console_output(&self) -> ConsoleOutput {
        self.console_output
    }

    /// Returns the log file path backed by the file sink.
    pub fn log_file_path(&self) -> &Path {
        &self.log_file_path
    }
}

/// Initialize the logging framework for the provided CLI command.
///
/// Filters, file sinks and console sinks follow deterministic configuration
/// precedence. Errors when invoked more than once per process unless tests
/// explicitly reset the guard.
pub fn init(command: &Command, global: &GlobalArgs) -> Result<LoggingGuard> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let context = detect_context(global);
    let workspace_root = resolve_workspace_path(global);
    let config = LoggingConfig::load(workspace_root.as_deref())?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_level))
        .context("failed to configure tracing level")?;
    let log_file_path = file::log_file_path(&config, workspace_root.as_deref())?;
    type BaseRegistry = Registry;
    type FileSubscriber = file::FileLayerStack<BaseRegistry>;

    let (file_layer, file_guard) =
        file::file_layer::<BaseRegistry>(&log_file_path, config.enable_file)?;

    let subscriber = tracing_subscriber::registry();
    let subscriber = subscriber.with(file_layer);

    let console_output = console::select_console_output(context, config.console_output);
    let console_layer = console::console_layer::<FileSubscriber>(console_output);
    let subscriber = subscriber.with(console_layer);

    let subscriber = subscriber.with(env_filter);
    subscriber
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;

    tracing::debug!(
        command = command.name(),
        context = ?context,
        console = %console_output,
        log_file = %log_file_path.display(),
        "logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
        console_output,
        log_file_path,
    })
}

fn resolve_workspace_path(global: &GlobalArgs) -> Option<PathBuf> {
    global
        .workspace
        .clone()
        .or_else(|| env::current_dir().ok())
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging multiple times.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
