//! CLI entry point for the flight cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use flight_cleaning::{CleaningConfig, Pipeline, read_flights, read_flights_file};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Output rendering of the cleaned table.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Polars table layout
    Table,
    /// Delimited text using the input delimiter
    Csv,
    /// Full pipeline result, including the summary
    Json,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Flight record cleaning pipeline",
    long_about = "Reconstructs flight codes, splits routes and normalizes airline names.\n\n\
                  EXAMPLES:\n  \
                  # Clean a file with the default step of 10\n  \
                  flight-cleaning -i flights.csv\n\n  \
                  # Read from stdin, use step 5, emit JSON\n  \
                  cat flights.csv | flight-cleaning --step 5 --format json"
)]
struct Args {
    /// Path to the delimited flight file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Increment between consecutive flight codes
    #[arg(
        long,
        default_value_t = flight_cleaning::config::DEFAULT_STEP,
        allow_negative_numbers = true
    )]
    step: i64,

    /// Field delimiter of the input
    #[arg(short, long, default_value_t = ';')]
    delimiter: char,

    /// Separator between origin and destination in the route field
    #[arg(long, default_value_t = '_')]
    route_separator: char,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries only the rendered table.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    let delimiter = u8::try_from(args.delimiter)
        .map_err(|_| anyhow!("Delimiter must be an ASCII character: {:?}", args.delimiter))?;

    let config = CleaningConfig::builder()
        .step(args.step)
        .delimiter(delimiter)
        .route_separator(args.route_separator)
        .build()
        .context("Invalid configuration")?;

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(|update| {
            debug!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            )
        })
        .build()?;

    let df = load_input(args.input.as_deref(), delimiter)?;
    info!("Loaded {} rows", df.height());

    let result = pipeline.process_frame(&df)?;

    if result.summary.flight_codes_overwritten > 0 {
        warn!(
            "{} present flight codes did not fit the sequence and were replaced",
            result.summary.flight_codes_overwritten
        );
    }
    for step in &result.processing_steps {
        info!("{}", step);
    }

    match args.format {
        OutputFormat::Table => {
            let df = result.cleaned.to_dataframe()?;
            println!("{df}");
        }
        OutputFormat::Csv => {
            let mut df = result.cleaned.to_dataframe()?;
            CsvWriter::new(&mut std::io::stdout())
                .include_header(true)
                .with_separator(delimiter)
                .finish(&mut df)?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn load_input(input: Option<&str>, delimiter: u8) -> Result<DataFrame> {
    match input {
        Some(path) => {
            if !Path::new(path).exists() {
                return Err(anyhow!("Input file not found: {}", path));
            }
            info!("Loading flights from: {}", path);
            Ok(read_flights_file(path, delimiter)?)
        }
        None => {
            info!("Loading flights from stdin");
            Ok(read_flights(std::io::stdin().lock(), delimiter)?)
        }
    }
}
