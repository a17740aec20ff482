#![allow(clippy::result_large_err)]

use crate::{
    cli::args::{FallbackArgs, GenerateArgs, GlobalArgs, InspectArgs, NormalizeArgs, PlanArgs},
    core::{
        pipeline::{FileSink, StdoutSink, WorkflowPipeline, WorkflowSink},
        types::ErrorCategory,
        workflow::{FallbackBuilder, GeneratedOutput, InspectionReport, Normalizer, WorkflowDocument},
        AppError, ConfigLoader, ConfigValidator, FlowsmithConfig,
    },
    Result,
};
use serde_json::Value;
use std::{
    env,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

/// Resolve configuration from `--config` or the workspace, then validate it.
pub fn load_config(global: &GlobalArgs) -> std::result::Result<FlowsmithConfig, AppError> {
    let config = match &global.config {
        Some(path) => {
            if !path.exists() {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!("Config file {} does not exist", path.display()),
                )
                .with_code("CONFIG_NOT_FOUND")
                .with_suggestion("Pass an existing TOML file to --config or omit the flag"));
            }
            ConfigLoader::load_with_overrides(path)?
        }
        None => ConfigLoader::load_from_workspace(&workspace_root(global))?,
    };
    ConfigValidator::validate(&config)?;
    Ok(config)
}

fn workspace_root(global: &GlobalArgs) -> PathBuf {
    global
        .workspace
        .clone()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_input(path: &Path) -> std::result::Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to read {}: {}", path.display(), e),
        )
        .with_code("INPUT_READ_FAILED")
    })
}

fn read_stdin() -> std::result::Result<String, AppError> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn load_examples(paths: &[PathBuf]) -> std::result::Result<Vec<Value>, AppError> {
    let mut examples = Vec::with_capacity(paths.len());
    for path in paths {
        let content = read_input(path)?;
        match GeneratedOutput::from_text(&content) {
            GeneratedOutput::Parsed(object) => examples.push(Value::Object(object)),
            GeneratedOutput::Unparsable => {
                tracing::warn!(path = %path.display(), "example holds no JSON object, ignoring");
            }
        }
    }
    Ok(examples)
}

fn print_document(document: &WorkflowDocument) -> Result<()> {
    let json = document.to_json_pretty()?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()?;
    Ok(())
}

pub async fn plan(global: &GlobalArgs, args: PlanArgs) -> Result<()> {
    let mut config = load_config(global)?;
    if args.no_research {
        config.search.enabled = false;
    }
    tracing::info!(research = config.search.enabled, "planning request");

    let pipeline = WorkflowPipeline::from_config(&config);
    let plan = pipeline.plan(&args.text).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}", plan.explanation.trim_end());
    }
    Ok(())
}

pub async fn generate(global: &GlobalArgs, args: GenerateArgs) -> Result<()> {
    let mut config = load_config(global)?;
    if args.no_research {
        config.search.enabled = false;
    }
    let examples = load_examples(&args.examples)?;
    tracing::info!(
        research = config.search.enabled,
        examples = examples.len(),
        "generating workflow"
    );

    let pipeline = WorkflowPipeline::from_config(&config);
    let file_sink;
    let stdout_sink;
    let sink: &dyn WorkflowSink = match &args.output {
        Some(dir) => {
            file_sink = FileSink::new(dir);
            &file_sink
        }
        None => {
            stdout_sink = StdoutSink {
                quiet: global.quiet,
            };
            &stdout_sink
        }
    };

    let report = pipeline.run(&args.text, &examples, sink).await?;
    if let Some(dir) = &args.output {
        if !global.quiet {
            eprintln!(
                "Wrote {} ({} workflow, confidence {}%)",
                FileSink::new(dir).document_path(&report.document).display(),
                report.origin,
                report.confidence
            );
        }
    }
    Ok(())
}

pub async fn normalize(global: &GlobalArgs, args: NormalizeArgs) -> Result<()> {
    let config = load_config(global)?;
    let input = match &args.file {
        Some(path) => read_input(path)?,
        None => read_stdin()?,
    };

    let output = GeneratedOutput::from_text(&input);
    if !output.is_parsed() {
        tracing::warn!("input holds no JSON object, emitting minimal workflow");
    }
    let document = Normalizer::new(config.workflow).normalize(output);
    print_document(&document)
}

pub async fn fallback(global: &GlobalArgs, args: FallbackArgs) -> Result<()> {
    let config = load_config(global)?;
    let builder = FallbackBuilder::new(config.workflow);
    let document = match args.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => builder.build_named(name),
        _ => builder.build_minimal(),
    };
    print_document(&document)
}

pub async fn inspect(global: &GlobalArgs, args: InspectArgs) -> Result<()> {
    let config = load_config(global)?;
    let content = read_input(&args.file)?;

    let output = GeneratedOutput::from_text(&content);
    if !output.is_parsed() {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("{} does not contain a workflow object", args.file.display()),
        )
        .with_code("NOT_A_WORKFLOW")
        .into());
    }

    let document = Normalizer::new(config.workflow).normalize(output);
    let report = InspectionReport::build(&document);
    println!("{}", report.render().trim_end());
    Ok(())
}
