//! Argument parsing, exit codes and console rendering for `fin-agent`

use agent_core::ToolCallRecord;
use agent_finance::{
    AgentKind, AgentResponse, FinanceConfig, FinanceError, LlmBackend, QueryDispatcher,
};
use clap::Parser;
use serde_json::json;
use std::io::{self, Write};

pub const EXIT_OK: u8 = 0;
pub const EXIT_BACKEND: u8 = 1;
pub const EXIT_VALIDATION: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;

const SEPARATOR_WIDTH: usize = 80;

const EXAMPLES: &str = "\
Examples:
  fin-agent --query \"What is the current price of AAPL?\" --agent financial
  fin-agent --query \"Latest AI news\" --agent web
  fin-agent --query \"NVIDIA stock analysis and AI market trends\" --agent multi
  fin-agent -q \"Analyst recommendations for TSLA\" -a financial --json";

#[derive(Parser, Debug, Clone)]
#[command(name = "fin-agent", version)]
#[command(about = "Ask the financial query agents a question", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Question to ask
    #[arg(short, long)]
    pub query: String,

    /// Agent to use: financial, web or multi
    #[arg(short, long)]
    pub agent: String,

    /// LLM backend (overrides LLM_BACKEND)
    #[arg(long)]
    pub backend: Option<LlmBackend>,

    /// Model id (overrides LLM_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Process exit code for a failed query
pub fn exit_code(err: &FinanceError) -> u8 {
    match err {
        FinanceError::Configuration(_) => EXIT_CONFIG,
        FinanceError::InvalidSelector { .. } | FinanceError::EmptyQuery => EXIT_VALIDATION,
        FinanceError::Backend { .. } => EXIT_BACKEND,
    }
}

/// Check the selector and query before anything needs credentials
pub fn validate_input(cli: &Cli) -> Result<AgentKind, FinanceError> {
    let kind: AgentKind = cli.agent.parse()?;
    if cli.query.trim().is_empty() {
        return Err(FinanceError::EmptyQuery);
    }
    Ok(kind)
}

/// Read the environment and apply command-line overrides
pub fn load_config(cli: &Cli) -> Result<FinanceConfig, FinanceError> {
    let mut config = FinanceConfig::from_env()?;
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Validate, configure, build the agents and answer the query
///
/// Results go to `out`; failures go to `errors` so `--json` output stays
/// parseable.
pub async fn run<O: Write, E: Write>(cli: &Cli, out: &mut O, errors: &mut E) -> io::Result<u8> {
    let kind = match validate_input(cli) {
        Ok(kind) => kind,
        Err(err) => return report_error(cli, &err, errors),
    };

    let built = load_config(cli).and_then(|config| QueryDispatcher::from_config(&config));
    let dispatcher = match built {
        Ok(dispatcher) => dispatcher,
        Err(err) => return report_error(cli, &err, errors),
    };

    execute(cli, kind, &dispatcher, out, errors).await
}

/// Run one query on an existing dispatcher and print the outcome
pub async fn execute<O: Write, E: Write>(
    cli: &Cli,
    kind: AgentKind,
    dispatcher: &QueryDispatcher,
    out: &mut O,
    errors: &mut E,
) -> io::Result<u8> {
    if !cli.json {
        render_header(out, kind, cli.query.trim())?;
    }

    match dispatcher.run_kind(&cli.query, kind).await {
        Ok(response) => {
            if cli.json {
                let text = serde_json::to_string_pretty(&response).map_err(io::Error::other)?;
                writeln!(out, "{text}")?;
            } else {
                render_response(out, &response)?;
            }
            Ok(EXIT_OK)
        }
        Err(err) => report_error(cli, &err, errors),
    }
}

fn report_error<W: Write>(cli: &Cli, err: &FinanceError, errors: &mut W) -> io::Result<u8> {
    let message = agent_utils::redact(&err.to_string());
    if cli.json {
        let body = json!({ "error": message, "error_type": err.error_type() });
        writeln!(errors, "{body}")?;
    } else {
        writeln!(errors, "\n[-] Error: {message}")?;
        writeln!(errors, "Error Type: {}", err.error_type())?;
    }
    Ok(exit_code(err))
}

fn separator(ch: char) -> String {
    ch.to_string().repeat(SEPARATOR_WIDTH)
}

fn render_header<W: Write>(out: &mut W, kind: AgentKind, query: &str) -> io::Result<()> {
    writeln!(out, "{}", separator('='))?;
    writeln!(out, "  Financial AI Agent System")?;
    writeln!(out, "{}", separator('='))?;
    writeln!(out, "[*] Using: {}", kind.definition().name)?;
    writeln!(out, "[?] Query: {query}")?;
    writeln!(out, "{}", separator('-'))
}

fn render_response<W: Write>(out: &mut W, response: &AgentResponse) -> io::Result<()> {
    writeln!(out, "\n[RESPONSE]:")?;
    writeln!(out, "{}", separator('-'))?;
    writeln!(out, "{}", response.content)?;
    writeln!(out, "{}", separator('-'))?;

    if !response.tool_calls.is_empty() {
        writeln!(out, "\n[*] Tool Calls:")?;
        for call in &response.tool_calls {
            writeln!(out, "  - {}", format_tool_call(call))?;
        }
    }

    writeln!(out, "\n[+] Completed in {} ms", response.elapsed_ms)
}

fn format_tool_call(call: &ToolCallRecord) -> String {
    let status = if call.is_error { " [failed]" } else { "" };
    format!("{}({}){status}", call.name, call.arguments)
}
