use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sensorprep::{router, AppState};
use sensorprep_core::{
    ingestion::{buildings_to_json, parse_payload},
    pipelines::{CleanPipeline, InterpolatePipeline, PreprocessPipeline},
    InterpolationMethod, PreprocessConfig,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sensor table cleaning and interpolation service", long_about = None)]
struct Cli {
    /// TOML file with pipeline defaults
    #[arg(long, global = true, env = "SENSORPREP_CONFIG")]
    config: Option<PathBuf>,
    /// Mismatch tolerance for merging duplicate sensors
    #[arg(long, global = true, env = "SENSORPREP_MERGE_THRESHOLD")]
    merge_threshold: Option<i64>,
    /// Minimum non-missing values a sensor column needs to survive cleaning
    #[arg(long, global = true, env = "SENSORPREP_MIN_VALID_VALUES")]
    min_valid_values: Option<usize>,
    /// Interpolation method (linear or time)
    #[arg(long, global = true, env = "SENSORPREP_INTERPOLATION_METHOD")]
    method: Option<InterpolationMethod>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Clean a building payload file
    Clean(FileArgs),
    /// Interpolate missing values in a building payload file
    Interpolate(FileArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SENSORPREP_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// JSON file mapping building names to building records
    input: PathBuf,
    /// Write the result here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Serve(args) => serve(args, config).await,
        Command::Clean(args) => process_file(&CleanPipeline, &args, &config),
        Command::Interpolate(args) => process_file(&InterpolatePipeline, &args, &config),
    }
}

fn resolve_config(cli: &Cli) -> Result<PreprocessConfig> {
    let mut config = match &cli.config {
        Some(path) => PreprocessConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PreprocessConfig::default(),
    };

    if let Some(threshold) = cli.merge_threshold {
        config.clean.merge_threshold = threshold;
    }
    if let Some(min_valid_values) = cli.min_valid_values {
        config.clean.min_valid_values = min_valid_values;
    }
    if let Some(method) = cli.method {
        config.interpolate.method = method;
    }

    Ok(config)
}

async fn serve(args: ServeArgs, config: PreprocessConfig) -> Result<()> {
    info!(?config, "starting sensorprep API server");

    let app = router(AppState::new(config));
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn process_file(
    pipeline: &dyn PreprocessPipeline,
    args: &FileArgs,
    config: &PreprocessConfig,
) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let buildings = parse_payload(&text)?;
    let processed = pipeline.run(buildings, config)?;
    let rendered = serde_json::to_string_pretty(&buildings_to_json(&processed)?)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                pipeline = pipeline.code_identifier(),
                output = %path.display(),
                buildings = processed.len(),
                "wrote result"
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
