//! REST server for the financial query agents

use agent_finance::{FinanceConfig, LlmBackend, QueryDispatcher};
use agent_utils::{LogConfig, init_tracing};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fin-agent-server")]
#[command(about = "Serve the financial query agents over HTTP", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "FIN_AGENT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "FIN_AGENT_PORT", default_value_t = 7777)]
    port: u16,

    /// LLM backend (overrides LLM_BACKEND)
    #[arg(long)]
    backend: Option<LlmBackend>,

    /// Model id (overrides LLM_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_tracing(&LogConfig {
        json: args.log_json,
        ..LogConfig::default()
    });

    let mut config = FinanceConfig::from_env()?;
    if let Some(backend) = args.backend {
        config = config.with_backend(backend);
    }
    if let Some(model) = args.model {
        config = config.with_model(model);
    }

    let dispatcher = QueryDispatcher::from_config(&config)?;
    info!(
        backend = dispatcher.backend(),
        model = dispatcher.model(),
        "Agents ready"
    );

    let app = agent_gateway::router(Arc::new(dispatcher));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
