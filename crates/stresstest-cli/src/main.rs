mod args;
mod error;
mod logging;
mod report;
mod signals;

use std::process::ExitCode;

use clap::Parser;
use stresstest_core::config::validate_config;
use stresstest_core::{spawn_test, EngineConfig, EngineEvent, EngineStatus, RunResult};
use tokio::sync::mpsc;

use crate::args::{Cli, OutputFormat};
use crate::error::CliError;

/// Capacity of the engine event channel; progress is at most a dozen events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.run_config();
    let errors = validate_config(&config);
    if !errors.is_empty() {
        return Err(CliError::InvalidArguments(errors));
    }

    let format = cli.format;
    if format == OutputFormat::Text {
        print!("{}", report::render_header(&config));
    }

    let (event_tx, mut event_rx) = mpsc::channel::<EngineEvent>(EVENT_CHANNEL_CAPACITY);
    let handle = spawn_test(EngineConfig::new(config).with_events(event_tx));
    let watcher = signals::spawn_signal_watcher(handle.cancel_token.clone());

    // Runs until the engine drops its sender at the end of the run.
    let printer = tokio::spawn(async move {
        let mut status = EngineStatus::default();
        while let Some(event) = event_rx.recv().await {
            match event {
                EngineEvent::Progress { completed, total } => {
                    let line = report::progress_line(completed, total);
                    match format {
                        OutputFormat::Text => println!("{line}"),
                        OutputFormat::Json => eprintln!("{line}"),
                    }
                }
                EngineEvent::StatusChange { status: next } => {
                    tracing::debug!(from = %status, to = %next, "engine status changed");
                    status = next;
                }
            }
        }
    });

    let result = handle.wait().await;
    watcher.abort();
    if let Err(err) = printer.await {
        tracing::warn!("progress printer failed: {err}");
    }

    print_result(&result?, format)
}

fn print_result(result: &RunResult, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => print!("{}", report::render(result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}
