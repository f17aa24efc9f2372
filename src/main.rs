use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use modemscope::bridge::EngineBridge;
use modemscope::commands::{self, CommandResponse};
use modemscope::config::ConfigStore;
use modemscope::core::{find_preset, ComputationRequest, ResultDocument, DEFAULT_FFT, PRESETS};
use modemscope::observability::generate_report;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modemscope", about = "Drive the spectrum/modem computation engine")]
struct Cli {
    /// Bridge config file (defaults to ~/.modemscope/bridge_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Run the FFT task
    Fft {
        /// Named parameter preset (audio, vibration, communication, default)
        #[arg(long)]
        preset: Option<String>,
        /// Parameters as a JSON object; overrides preset values
        #[arg(long)]
        params: Option<String>,
    },
    /// Run the modulation/channel simulation task
    Simulate {
        /// Parameters as a JSON object
        #[arg(long)]
        params: String,
    },
    /// Check the engine is reachable with default FFT parameters
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::at_default_location()?,
    };
    let config = store
        .load()
        .await
        .with_context(|| format!("Failed to load {}", store.path().display()))?
        .apply_env()?;
    let tuning = config.spectral;

    let bridge = EngineBridge::new(config);

    let (request, response) = match cli.command {
        Action::Fft { preset, params } => {
            let request = fft_request(preset.as_deref(), params.as_deref())?;
            let response = commands::generate_fft(&bridge, request.to_json()).await;
            (Some(request), response)
        }
        Action::Simulate { params } => {
            let value = parse_params(&params)?;
            (
                ComputationRequest::from_json(value.clone()).ok(),
                commands::run_simulation(&bridge, value).await,
            )
        }
        Action::Ping => (
            Some(DEFAULT_FFT.to_request()),
            commands::test_connection(&bridge).await,
        ),
    };

    let succeeded = print_response(&response, request.as_ref(), &tuning)?;
    eprintln!("{}", generate_report(&bridge.metrics().snapshot()));

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_params(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("--params must be a JSON object")
}

fn fft_request(preset: Option<&str>, params: Option<&str>) -> Result<ComputationRequest> {
    let mut request = match preset {
        Some(name) => match find_preset(name) {
            Some(preset) => preset.to_request(),
            None => {
                let known: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
                bail!("Unknown preset '{}', expected one of {:?}", name, known);
            }
        },
        None => DEFAULT_FFT.to_request(),
    };

    if let Some(raw) = params {
        let overrides = ComputationRequest::from_json(parse_params(raw)?)?;
        if let Value::Object(map) = overrides.to_json() {
            for (key, value) in map {
                request.set(key, value);
            }
        }
    }
    Ok(request)
}

fn print_response(
    response: &CommandResponse<ResultDocument>,
    request: Option<&ComputationRequest>,
    tuning: &modemscope::config::SpectralTuning,
) -> Result<bool> {
    match &response.data {
        Some(document) => {
            let view = commands::analyze(document, request, tuning);
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(true)
        }
        None => {
            println!("{}", serde_json::to_string_pretty(response)?);
            Ok(false)
        }
    }
}
