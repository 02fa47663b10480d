//! support-router command line
//!
//! Loads the router from a YAML file (or the environment) and runs one
//! generation, or prints provider statistics and health.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use support_router::core::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use support_router::utils::logging::init_logging;
use support_router::{Config, GenerationRequest, Router, build_info};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "support-router",
    version,
    about = "Route support-assistant generations across LLM providers"
)]
struct Cli {
    /// YAML configuration; the environment is used when omitted
    #[arg(short, long, global = true, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a complete answer and print it as JSON
    Generate(PromptArgs),
    /// Stream an answer to stdout as it arrives
    Stream(PromptArgs),
    /// Print per-provider statistics as JSON
    Stats,
    /// Print the health report; exits non-zero when no provider is healthy
    Health,
    /// Validate the configuration and print it without credentials
    CheckConfig,
    /// Print build information
    Info,
}

#[derive(Debug, Args)]
struct PromptArgs {
    /// User prompt
    prompt: String,

    /// System prompt
    #[arg(short, long)]
    system: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Preferred model, used by providers that serve it
    #[arg(long)]
    model: Option<String>,
}

impl PromptArgs {
    fn into_request(self) -> GenerationRequest {
        let mut request = GenerationRequest::new(self.prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        request.system_prompt = self.system;
        request.model = self.model;
        request
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Display chain, not Debug
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Command::Info = cli.command {
        println!("{}", serde_json::to_string_pretty(&build_info())?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_ref()).await?;
    init_logging(&config.logging)?;

    if let Command::CheckConfig = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let router = Arc::new(Router::from_config(&config)?);

    let code = match cli.command {
        Command::Generate(args) => {
            let response = router.generate(&args.into_request()).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            ExitCode::SUCCESS
        }
        Command::Stream(args) => stream(&router, args.into_request()).await?,
        Command::Stats => {
            println!(
                "{}",
                serde_json::to_string_pretty(&router.get_provider_stats())?
            );
            ExitCode::SUCCESS
        }
        Command::Health => {
            let report = router.health_check();
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::CheckConfig | Command::Info => ExitCode::SUCCESS,
    };

    router.shutdown();
    Ok(code)
}

/// Forward fragments to stdout until the stream ends or Ctrl-C
async fn stream(router: &Arc<Router>, request: GenerationRequest) -> anyhow::Result<ExitCode> {
    let mut stream = router.generate_stream(request)?;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            fragment = stream.next() => match fragment {
                Some(Ok(text)) => {
                    stdout.write_all(text.as_bytes())?;
                    stdout.flush()?;
                }
                Some(Err(e)) => {
                    writeln!(stdout)?;
                    return Err(e.into());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling stream");
                stream.cancel();
                writeln!(stdout)?;
                return Ok(ExitCode::from(130));
            }
        }
    }

    writeln!(stdout)?;
    info!("Stream complete");
    Ok(ExitCode::SUCCESS)
}
