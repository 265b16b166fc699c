//! `fin-agent`: ask one of the financial query agents a question

mod app;

use agent_utils::{LogConfig, init_tracing};
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = app::Cli::parse();
    init_tracing(&LogConfig::cli(cli.verbose));

    let code = app::run(&cli, &mut std::io::stdout(), &mut std::io::stderr())
        .await
        .context("failed to write output")?;
    Ok(ExitCode::from(code))
}
