use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod classifier;
mod config;
mod error;
mod instance;
mod joblog;
mod reconcile;
mod resolver;

use catalog::ReqwestTransport;
use config::ReconcileConfig;
use error::ReconcileError;
use joblog::TracingJobLog;
use reconcile::{Invocation, Reconciler};

#[derive(Parser, Debug)]
#[command(name = "arr-reconcile")]
#[command(about = "Reconcile Sonarr/Radarr state after a Tdarr transcode")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to the user config dir)
    #[arg(short, long, env = "ARR_RECONCILE_CONFIG")]
    config: Option<PathBuf>,

    /// Override one config key, e.g. `--input sonarr_host=http://sonarr:8989`
    #[arg(short, long = "input", value_name = "KEY=VALUE", value_parser = config::parse_input_pair)]
    inputs: Vec<(String, String)>,

    /// Flow variables (JSON object) passed through to the output
    #[arg(long, value_name = "JSON")]
    variables: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// The transcode failed: tag, re-monitor and search, then exit non-zero
    Failure(PathArgs),
    /// The transcode succeeded: refresh and optionally unmonitor, print the route
    Success(PathArgs),
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Library file the flow started from
    #[arg(long, env = "ARR_RECONCILE_ORIGINAL_PATH")]
    original_path: String,

    /// Working file, when it differs from the original
    #[arg(long, env = "ARR_RECONCILE_CURRENT_PATH", default_value = "")]
    current_path: String,
}

fn parse_variables(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    match serde_json::from_str(raw).context("Failed to parse --variables")? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => anyhow::bail!("--variables must be a JSON object, got {}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Job output goes to stderr so stdout only carries the result JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arr_reconcile=info,job=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ReconcileConfig::load(cli.config.as_deref(), &cli.inputs);
    config.log_config();

    let variables = parse_variables(cli.variables.as_deref())?;
    let transport = Arc::new(ReqwestTransport::new()?);
    let reconciler = Reconciler::new(config, transport, Arc::new(TracingJobLog));

    match cli.mode {
        Mode::Failure(paths) => {
            let invocation = Invocation {
                original_path: paths.original_path,
                current_path: paths.current_path,
                variables,
            };
            match reconciler.reconcile_failure(&invocation).await {
                Ok(never) => match never {},
                Err(err) => {
                    if let ReconcileError::TranscodeFailed(outcome) = &err {
                        tracing::info!("Outcome: {}", serde_json::to_string(outcome)?);
                    }
                    Err(err.into())
                }
            }
        }
        Mode::Success(paths) => {
            let invocation = Invocation {
                original_path: paths.original_path,
                current_path: paths.current_path,
                variables,
            };
            let output = reconciler.reconcile_success(&invocation).await?;
            println!("{}", serde_json::to_string(&output)?);
            Ok(())
        }
    }
}
