//! Readyprobe CLI
//!
//! Wait for the service under test, check its success and error endpoints,
//! and exit 0 only if every check passed.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use readyprobe::checks::CHECKS;
use readyprobe::client::ProbeClient;
use readyprobe::config::{Config, TARGET_HOST_ENV};
use readyprobe::runner::{RunReport, Runner};

/// Readyprobe - wait for an HTTP service, then check its endpoints
#[derive(Debug, Parser)]
#[command(name = "readyprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Defaults to `run` with no flags
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Wait for the service and run the checks
    Run(RunArgs),

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "readyprobe.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List available checks
    List,

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "readyprobe.yaml")]
        config: PathBuf,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Path to an optional configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host of both endpoints (overrides TARGET_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port of the success server
    #[arg(long)]
    success_port: Option<u16>,

    /// Port of the error server
    #[arg(long)]
    error_port: Option<u16>,

    /// Readiness attempts before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay between readiness attempts (e.g. 2s, 500ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    retry_delay: Option<Duration>,

    /// Per-request timeout (e.g. 10s)
    #[arg(long, value_parser = humantime::parse_duration)]
    request_timeout: Option<Duration>,

    /// Specific checks to run (comma-separated)
    #[arg(short = 'C', long, value_delimiter = ',')]
    checks: Option<Vec<String>>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn setup_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries the tagged progress lines
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args).await,

        Commands::Init { output, force } => init_config(&output, force),

        Commands::List => {
            list_checks();
            Ok(())
        }

        Commands::Validate { config } => validate_config(&config),
    }
}

/// Defaults, then the file, then TARGET_HOST, then flags
fn resolve_config(args: &RunArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok());

    if let Some(host) = &args.host {
        config.target.host = host.clone();
    }
    if let Some(port) = args.success_port {
        config.target.success_port = port;
    }
    if let Some(port) = args.error_port {
        config.target.error_port = port;
    }
    if let Some(timeout) = args.request_timeout {
        config.target.request_timeout = Some(timeout);
    }
    if let Some(attempts) = args.max_attempts {
        config.readiness.max_attempts = attempts;
    }
    if let Some(delay) = args.retry_delay {
        config.readiness.delay = delay;
    }

    Ok(config)
}

async fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let runner_config = config
        .to_runner_config(args.checks.as_deref())
        .context("Invalid configuration")?;

    tracing::info!(
        host = %config.target.host,
        checks = ?runner_config.checks.iter().map(|c| c.check.name()).collect::<Vec<_>>(),
        "Configuration resolved"
    );

    let probe = ProbeClient::new(config.target.request_timeout)
        .context("Failed to create HTTP client")?;
    let runner = Runner::new(runner_config, Arc::new(probe));
    let report = runner.run().await;

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }

    if let Some(fatal) = &report.fatal {
        anyhow::bail!("{fatal}")
    }
    if !report.outcome.is_pass() {
        anyhow::bail!("{} of {} checks FAILED", report.failed_count(), report.results.len())
    }
    Ok(())
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

/// Generate a default configuration file
fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    tracing::info!(path = %output.display(), "Configuration file created");
    println!("Created {}", output.display());
    println!();
    println!("Edit the file to point at your service, then run:");
    println!("  readyprobe run --config {}", output.display());

    Ok(())
}

/// List available checks
fn list_checks() {
    println!("Available checks (in run order):");
    println!();

    for (name, check) in CHECKS.iter() {
        println!("  {name:10} - {}", check.description());
    }

    println!();
    println!("Run specific checks with:");
    println!("  readyprobe run --checks success");
}

/// Validate a configuration file
fn validate_config(config_path: &Path) -> Result<()> {
    tracing::info!(config = %config_path.display(), "Validating configuration");

    let mut config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate().context("Invalid configuration")?;

    println!("Configuration is valid!");
    println!();
    println!("Success endpoint: {}", config.target.success_endpoint());
    println!("Error endpoint:   {}", config.target.error_endpoint());
    if std::env::var(TARGET_HOST_ENV).is_ok_and(|host| !host.trim().is_empty()) {
        println!("  (host taken from {TARGET_HOST_ENV})");
    }
    println!(
        "Readiness: {} attempts, {} apart",
        config.readiness.max_attempts,
        humantime::format_duration(config.readiness.delay)
    );

    println!();
    for name in CHECKS.keys() {
        let status = if config.is_check_enabled(name) {
            "enabled"
        } else {
            "disabled"
        };
        println!("  - {name}: {status}");
    }

    Ok(())
}
