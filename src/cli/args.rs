use clap::Args;
use std::path::PathBuf;

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Workspace holding flowsmith.toml and .flowsmith/ (default: current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Path to custom config file (default: {workspace}/flowsmith.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print only the workflow output; silence logs and explanations
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Free-text automation request
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Print the plan (intent, research, explanation) as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip web research
    #[arg(long)]
    pub no_research: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Free-text automation request
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Write <name>.json and <name>.txt into this directory instead of stdout
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Existing workflow document used as a reference (repeatable)
    #[arg(long = "example", value_name = "FILE")]
    pub examples: Vec<PathBuf>,

    /// Skip web research
    #[arg(long)]
    pub no_research: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NormalizeArgs {
    /// Workflow JSON (or text containing it); reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FallbackArgs {
    /// Workflow name (default: configured default name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Workflow JSON file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
