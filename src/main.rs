//! rshostlist 命令行入口

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rshostlist::{
    Configuration, CustomConfigBuilder, FormatOptions, HostlistCompiler, OutputFormat, SourceType,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputType {
    Hosts,
    Adblock,
}

impl From<InputType> for SourceType {
    fn from(value: InputType) -> Self {
        match value {
            InputType::Hosts => SourceType::Hosts,
            InputType::Adblock => SourceType::Adblock,
        }
    }
}

/// Compile filter lists from adblock and /etc/hosts sources
#[derive(Debug, Parser)]
#[command(name = "rshostlist", version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, conflicts_with = "input")]
    config: Option<PathBuf>,

    /// Quick mode: compile these sources (URLs or paths) without a configuration file
    #[arg(short, long, num_args = 1..)]
    input: Vec<String>,

    /// Source type for quick mode
    #[arg(short = 't', long = "input-type", value_enum, default_value = "hosts")]
    input_type: InputType,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the compiled rules into a target format
    /// (adblock, hosts, dnsmasq, pihole, unbound, json, doh)
    #[arg(short, long)]
    format: Option<String>,

    /// IP address used by the hosts format
    #[arg(long, default_value = rshostlist::engine::formatter::DEFAULT_BLOCKING_IP)]
    ip: String,

    /// Platform tag for `!#if` conditions (e.g. windows, mac, android, ios)
    #[arg(long)]
    platform: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

async fn load_configuration(cli: &Cli) -> Result<Configuration> {
    if let Some(path) = &cli.config {
        return Configuration::load(path)
            .await
            .with_context(|| format!("load configuration {}", path.display()));
    }
    if !cli.input.is_empty() {
        return Ok(Configuration::from_inputs(&cli.input, cli.input_type.into()));
    }
    anyhow::bail!("either --config or --input is required")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let configuration = load_configuration(&cli).await?;

    let mut builder = CustomConfigBuilder::new().timeout(Duration::from_secs(cli.timeout));
    if let Some(platform) = &cli.platform {
        builder = builder.platform(platform.clone());
    }
    let compiler = HostlistCompiler::with_options(builder.build()).context("initialize compiler")?;

    let result = compiler
        .compile(&configuration)
        .await
        .with_context(|| format!("compile {}", configuration.name))?;

    let content = match &cli.format {
        Some(name) => {
            let format: OutputFormat = name.parse()?;
            let options = FormatOptions {
                ip: cli.ip.clone(),
                include_header: true,
                name: configuration.name.clone(),
                generated_at: None,
            };
            let formatted = rshostlist::format(&result.rules, format, &options)?;
            info!("Rendered {} hostnames as {}", formatted.rule_count, formatted.format);
            formatted.content
        }
        None => result.rules.join("\n"),
    };

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, &content)
                .await
                .with_context(|| format!("write {}", path.display()))?;
            info!(
                "Wrote {} rules to {} in {} ms",
                result.metrics.rule_count,
                path.display(),
                result.metrics.total_duration_ms
            );
        }
        None => print!("{}", content),
    }

    for warning in &result.metrics.warnings {
        debug!("warning: {}", warning);
    }

    Ok(())
}
