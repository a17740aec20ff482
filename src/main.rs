use clap::Parser;
use flowsmith::cli::{self, Args};
use flowsmith::core::{AppError, DefaultErrorReporter, ErrorReporter};
use flowsmith::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match logging::init(&args.command, &args.global) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("[WARNING] logging disabled: {:#}", err);
            None
        }
    };

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let reporter = DefaultErrorReporter::new();
            match err.downcast::<AppError>() {
                Ok(app_error) => reporter.report_error(&app_error),
                Err(other) => reporter.report_error(&AppError::from(other)),
            }
            ExitCode::FAILURE
        }
    }
}
