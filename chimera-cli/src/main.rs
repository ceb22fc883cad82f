//! ChimeraKit CLI

use anyhow::{Context, Result};
use chimera_config::{load_host_configuration, resolve_environment};
use chimera_core::ExitCode;
use chimera_host::Host;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "chimera")]
#[command(about = "ChimeraKit module host", long_about = None)]
#[command(version)]
#[command(after_help = "Run without a module name, or with `list`, to show the available modules.")]
struct Cli {
    /// Directory containing appsettings.json
    #[arg(short, long, default_value = ".")]
    config: PathBuf,

    /// Configuration environment (overrides CHIMERAKIT_ENV)
    #[arg(short, long)]
    environment: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Module name followed by the module's own arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code.into(),
        Err(e) => {
            tracing::error!(error = ?e, "Fatal error");
            eprintln!("Fatal error: {e:#}");
            ExitCode::Error.into()
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    init_tracing(&cli.log_level, cli.log_json)?;

    let environment = resolve_environment(cli.environment.as_deref());
    tracing::debug!(config = %cli.config.display(), %environment, "Loading configuration");

    let configuration = load_host_configuration(&cli.config, &environment)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let host = Host::builder(configuration).build()?;
    let code = host.run(cli.args, &mut std::io::stdout()).await?;

    Ok(code)
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()));

    // stdout belongs to module output
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
