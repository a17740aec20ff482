pub mod args;
pub mod commands;

pub use args::{FallbackArgs, GenerateArgs, GlobalArgs, InspectArgs, NormalizeArgs, PlanArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "flowsmith")]
#[command(version = crate::VERSION)]
#[command(about = "Turn free-text automation requests into importable n8n workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: plan a request, generate the workflow, then inspect it before importing."
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Analyze a request and gather research",
        long_about = "Plan extracts the intent record from a request (generative backend when configured, keyword heuristics otherwise) and ranks web research for it.",
        after_help = "Example:\n    flowsmith plan \"send me a daily email report of new sheet rows\" --json"
    )]
    Plan(PlanArgs),
    #[command(
        about = "Produce a workflow document from a request",
        long_about = "Generate plans the request, asks the generative backend for a workflow and normalizes it. When generation is unavailable the minimal two-node workflow is emitted instead.",
        after_help = "Example:\n    flowsmith generate \"post new github issues to slack\" --output ./workflows"
    )]
    Generate(GenerateArgs),
    #[command(
        about = "Repair a workflow document",
        long_about = "Normalize fills every missing field, node default and connection attribute so the document imports cleanly. Input that holds no JSON object yields the minimal workflow.",
        after_help = "Example:\n    flowsmith normalize draft.json > fixed.json"
    )]
    Normalize(NormalizeArgs),
    #[command(
        about = "Print the minimal two-node workflow",
        long_about = "Fallback emits the webhook trigger plus timestamp workflow used whenever generation fails.",
        after_help = "Example:\n    flowsmith fallback --name \"Inbound Hook\""
    )]
    Fallback(FallbackArgs),
    #[command(
        about = "Summarize a workflow document",
        long_about = "Inspect reports node and connection counts, required environment variables, suggested credentials, dangling connections and nodes no trigger reaches.",
        after_help = "Example:\n    flowsmith inspect workflows/daily-report.json"
    )]
    Inspect(InspectArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Plan(_) => "plan",
            Command::Generate(_) => "generate",
            Command::Normalize(_) => "normalize",
            Command::Fallback(_) => "fallback",
            Command::Inspect(_) => "inspect",
        }
    }
}

pub async fn run(args: Args) -> crate::Result<()> {
    let global = args.global;
    match args.command {
        Command::Plan(plan_args) => commands::plan(&global, plan_args).await,
        Command::Generate(generate_args) => commands::generate(&global, generate_args).await,
        Command::Normalize(normalize_args) => commands::normalize(&global, normalize_args).await,
        Command::Fallback(fallback_args) => commands::fallback(&global, fallback_args).await,
        Command::Inspect(inspect_args) => commands::inspect(&global, inspect_args).await,
    }
}
