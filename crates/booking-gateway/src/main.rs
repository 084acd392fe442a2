//! Hotel booking prediction - command-line entry point
//!
//! Loads the fitted artifacts once and either classifies a single booking or
//! serves predictions over HTTP.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use booking_core::types::BookingRecord;
use booking_gateway::config::AppConfig;
use booking_gateway::form::BookingForm;
use booking_gateway::metrics::MetricsRegistry;
use booking_gateway::server::{start_server, AppStatus, ServerState};
use booking_model::inference::BookingPredictor;

/// Hotel booking cancellation predictor
#[derive(Parser, Debug)]
#[command(name = "booking-predict")]
#[command(version)]
#[command(about = "Predict whether a hotel booking will be cancelled", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one booking
    Predict {
        #[command(flatten)]
        input: InputArgs,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the ordered feature vector for one booking
    Preprocess {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Load the artifacts and verify they fit together
    Check,
    /// Serve predictions over HTTP
    Serve {
        /// Port to listen on (overrides the configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// JSON input file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Treat the input as overrides on the default booking form
    #[arg(long)]
    form: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_found = Path::new(&args.config).exists();
    let config = if config_found {
        AppConfig::load(&args.config)
            .with_context(|| format!("failed to load configuration from {}", args.config))?
    } else {
        AppConfig::from_env()?
    };

    // Logs go to stderr so stdout stays machine-readable
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.log_level)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if !config_found {
        tracing::warn!("Config file {} not found, using defaults", args.config);
    }
    tracing::debug!("Configuration loaded: {:?}", config);

    match args.command {
        Command::Predict { input, json } => run_predict(&config, &input, json),
        Command::Preprocess { input } => run_preprocess(&config, &input),
        Command::Check => run_check(&config),
        Command::Serve { port } => run_serve(&config, port.unwrap_or(config.port)).await,
    }
}

fn load_predictor(config: &AppConfig) -> anyhow::Result<BookingPredictor> {
    BookingPredictor::load(&config.artifacts.paths()).context("failed to load artifacts")
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

/// Build the record to classify, plus the form it came from if any
fn read_booking(input: &InputArgs) -> anyhow::Result<(BookingRecord, Option<BookingForm>)> {
    let text = read_input(&input.input)?;
    if input.form {
        let form = if text.trim().is_empty() {
            BookingForm::default()
        } else {
            BookingForm::default().apply_overrides_json(&text)?
        };
        Ok((form.to_booking_record(), Some(form)))
    } else {
        Ok((BookingRecord::from_json_str(&text)?, None))
    }
}

fn run_predict(config: &AppConfig, input: &InputArgs, json: bool) -> anyhow::Result<()> {
    let predictor = load_predictor(config)?;
    let (record, form) = read_booking(input)?;
    let prediction = predictor.predict(&record)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        if let Some(form) = form {
            println!("Total estimated cost: ${:.2}", form.total_estimated_cost());
        }
        println!("{}", prediction.summary());
    }
    Ok(())
}

fn run_preprocess(config: &AppConfig, input: &InputArgs) -> anyhow::Result<()> {
    let predictor = load_predictor(config)?;
    let (record, _) = read_booking(input)?;
    let vector = predictor.preprocess(&record)?;
    println!("{}", serde_json::to_string_pretty(&vector)?);
    Ok(())
}

fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let predictor = load_predictor(config)?;
    let store = predictor.store();
    let status = store.status();

    println!("classifier: {} ({} features)", store.classifier().name(), store.classifier().n_features());
    println!("schema:     {} columns", store.schema().n_columns());
    println!("scaler:     {}", if status.scaler_fitted { "fitted" } else { "placeholder" });
    println!("encoders:   {}", if status.encoders_fitted { "fitted" } else { "placeholder" });

    store.check_integrity()?;
    if !status.is_ready() {
        anyhow::bail!("placeholder artifacts in use, predictions will fail");
    }
    println!("ok");
    Ok(())
}

async fn run_serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting {} v{}", config.name, env!("CARGO_PKG_VERSION"));

    let predictor = load_predictor(config)?;
    predictor
        .store()
        .check_integrity()
        .context("refusing to serve mismatched artifacts")?;

    let metrics = Arc::new(MetricsRegistry::new());
    let state = Arc::new(ServerState::new(predictor, metrics));

    if state.predictor.store().status().is_ready() {
        state.set_status(AppStatus::Running).await;
    } else {
        tracing::warn!("Serving with placeholder artifacts");
        state.set_status(AppStatus::Degraded).await;
    }

    tokio::select! {
        result = start_server(state.clone(), port) => {
            if let Err(e) = &result {
                tracing::error!("Server error: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            state.set_status(AppStatus::ShuttingDown).await;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
