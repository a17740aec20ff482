use crate::cli::args::GlobalArgs;
use std::env;

pub const REMOTE_AGENT_ENV: &str = "FLOWSMITH_REMOTE_AGENT";

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Interactive use from a terminal.
    LocalDev,
    /// `--quiet` runs; only the workflow output is printed.
    Quiet,
    /// Execution driven by another process on a different host.
    RemoteAgent,
}

impl ExecutionContext {
    /// Returns `true` when console sinks are off unless explicitly configured.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Quiet | ExecutionContext::RemoteAgent)
    }
}

/// Derive the active execution context from global flags plus overrides.
pub fn detect_context(global: &GlobalArgs) -> ExecutionContext {
    if global.quiet {
        return ExecutionContext::Quiet;
    }
    if remote_override_enabled() {
        return ExecutionContext::RemoteAgent;
    }
    ExecutionContext::LocalDev
}

fn remote_override_enabled() -> bool {
    env::var(REMOTE_AGENT_ENV)
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
