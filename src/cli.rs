use crate::config_loader::{load_config, ServiceConfig};
use crate::engine::RiskEngine;
use crate::features::PredictionRequest;
use crate::log_sink::init_logging;
use crate::web::build_router;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level CLI for the MRL risk service
#[derive(Parser, Debug)]
#[command(name = "mrl_risk", version, about = "MRL violation risk scoring service")]
pub struct Cli {
    /// Config file (defaults to $MRL_CONFIG_PATH, then mrl_risk.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API (default when no command is given)
    Serve {
        /// Host/IP to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Trained model artifact
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Score a single request and print the assessment as JSON
    Assess {
        /// Request body, e.g. '{"dosage": 120, "drugType": "antibiotic"}'
        #[arg(long, default_value = "{}")]
        json: String,
        /// Trained model artifact
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    init_logging(&config.log_filter);

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        model: None,
    }) {
        Commands::Serve { host, port, model } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            serve(config).await
        }
        Commands::Assess { json, model } => {
            let engine = RiskEngine::from_model_path(&model.unwrap_or(config.model_path));
            let request = PredictionRequest::from_slice(json.as_bytes())?;
            let assessment = engine.assess(&request)?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
            Ok(())
        }
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let engine = Arc::new(RiskEngine::from_model_path(&config.model_path));
    tracing::info!(
        strategy = engine.strategy().name(),
        model_loaded = engine.model_loaded(),
        "Risk engine ready"
    );

    let app = build_router(engine);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("MRL risk service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
