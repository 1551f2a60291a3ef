mod config;

use clap::Parser;
use std::{
    borrow::Cow,
    fs,
    io::{self, Write},
    process::ExitCode,
};
use tracing_subscriber::EnvFilter;
use tripsplit_application::TripProcessor;
use tripsplit_infrastructure::TripFileParser;
use tripsplit_presentation::TripReportPresenter;

use crate::config::{AppConfig, Cli};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let result = AppConfig::from_cli(Cli::parse()).and_then(|config| {
        init_logging(&config);
        run(&config)
    });

    finish(result, &mut io::stdout().lock(), &mut io::stderr().lock())
}

/// Prints the report, or a single `Error:` line regardless of log filters.
fn finish(result: CliResult<String>, out: &mut impl Write, err_out: &mut impl Write) -> ExitCode {
    let failure = match result {
        Ok(report) => match out.write_all(report.as_bytes()).and_then(|()| out.flush()) {
            Ok(()) => return ExitCode::SUCCESS,
            Err(err) => Cow::Owned(format!("Failed to write report: {err}")),
        },
        Err(err) => err,
    };

    let _ = writeln!(err_out, "Error: {failure}");
    ExitCode::FAILURE
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(config: &AppConfig) -> CliResult<String> {
    let path = config.trip_path.display();
    let source = fs::read_to_string(&config.trip_path)
        .map_err(|err| format!("Failed to read '{path}': {err}"))?;
    tracing::debug!(path = %path, bytes = source.len(), "Read trip file");

    render_report(&source, config)
}

fn render_report(source: &str, config: &AppConfig) -> CliResult<String> {
    let parser = TripFileParser;
    let processor = TripProcessor::new(&parser, config.context);

    let trip = processor
        .load_trip(source)
        .map_err(|err| format!("Failed to load trip: {err}"))?;
    let result = processor
        .build_settlement_result(&trip)
        .map_err(|err| format!("Failed to settle '{}': {err}", trip.label()))?;

    Ok(TripReportPresenter::render(&trip, &result, &trip))
}
