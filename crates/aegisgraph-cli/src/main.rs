//! AegisGraph CLI tool.
//!
//! Runs fraud analysis on CSV ledgers and inspects the kernel registry and
//! configuration.

use aegisgraph::ingest::read_csv_file;
use aegisgraph::pipeline::Analyzer;
use aegisgraph::report::AnalysisEnvelope;
use aegisgraph_core::{
    config::EngineConfig, domain::Domain, kernel::KernelMetadata, observability::LogLevel,
};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "aegisgraph")]
#[command(version, about = "Money-laundering ring detection for transaction ledgers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV ledger and print the result as JSON
    Analyze {
        /// CSV file with transaction_id, sender_id, receiver_id, amount, timestamp
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run the detectors in parallel
        #[arg(long)]
        concurrent: bool,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// List registered kernels
    Kernels {
        /// Filter by domain (graph, compliance)
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Print a configuration as TOML
    Config {
        /// Preset to print (development, production, testing); defaults to the environment
        #[arg(short, long)]
        env: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            config,
            concurrent,
            compact,
        } => {
            let config = load_config(config.as_deref(), concurrent)?;
            init_logging(&config, cli.verbose)?;
            cmd_analyze(config, &input, output.as_deref(), compact).await?;
        }

        Commands::Kernels { domain } => {
            init_logging(&EngineConfig::from_env()?, cli.verbose)?;
            cmd_kernels(domain.as_deref())?;
        }

        Commands::Config { env } => {
            cmd_config(env.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, concurrent: bool) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::from_env()?,
    };
    if concurrent {
        config.runtime.concurrent_detectors = true;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &EngineConfig, verbose: bool) -> anyhow::Result<()> {
    let level = effective_level(config.logging.level, verbose);
    config.logging.clone().with_level(level).init()?;
    Ok(())
}

/// `-v` raises the configured level to at least Debug; it never lowers it.
fn effective_level(configured: LogLevel, verbose: bool) -> LogLevel {
    match configured {
        LogLevel::Info | LogLevel::Warn | LogLevel::Error if verbose => LogLevel::Debug,
        level => level,
    }
}

async fn cmd_analyze(
    config: EngineConfig,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    let phase = Instant::now();
    let transactions =
        read_csv_file(input).with_context(|| format!("reading ledger {}", input.display()))?;
    tracing::info!(
        transactions = transactions.len(),
        elapsed_ms = phase.elapsed().as_millis() as u64,
        "Parsed CSV"
    );
    if transactions.is_empty() {
        bail!("Invalid CSV format or empty file: {}", input.display());
    }

    let total_transactions = transactions.len();
    let report = Analyzer::new(config).analyze_async(transactions).await?;
    let envelope = AnalysisEnvelope::new(report, total_transactions, started.elapsed());

    tracing::info!(
        analysis_id = %envelope.analysis_id,
        accounts = envelope.total_accounts,
        flagged = envelope.suspicious_accounts_flagged,
        rings = envelope.fraud_rings_detected,
        seconds = envelope.processing_time_seconds,
        "Analysis complete"
    );

    let json = envelope.to_json(!compact)?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("writing result to {}", path.display()))?;
            println!("Result written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_kernels(domain: Option<&str>) -> anyhow::Result<()> {
    let registry = aegisgraph::registry()?;

    let domains: Vec<Domain> = match domain {
        Some(name) => vec![name.parse::<Domain>().map_err(anyhow::Error::msg)?],
        None => Domain::ALL.to_vec(),
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              AegisGraph Kernel Catalogue                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    for domain in &domains {
        print_domain_kernels(*domain, &registry.by_domain(*domain));
    }

    let stats = registry.stats();
    println!("Total: {} kernels across {} domains", stats.total, stats.by_domain.len());
    Ok(())
}

fn print_domain_kernels(domain: Domain, kernels: &[KernelMetadata]) {
    println!("┌─────────────────────────────────────────────────────────────────┐");
    println!("│ {} ({} kernels)", domain, kernels.len());
    println!("├─────────────────────────────────────────────────────────────────┤");
    for kernel in kernels {
        println!(
            "│  {:<24} v{:<3} - {}",
            kernel.name(),
            kernel.version,
            kernel.description
        );
    }
    println!("└─────────────────────────────────────────────────────────────────┘\n");
}

fn cmd_config(env: Option<&str>) -> anyhow::Result<()> {
    let config = match env {
        Some(env) => EngineConfig::for_environment(env),
        None => EngineConfig::from_env()?,
    };
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level_keeps_preset() {
        assert_eq!(effective_level(LogLevel::Trace, false), LogLevel::Trace);
        assert_eq!(effective_level(LogLevel::Debug, false), LogLevel::Debug);
        assert_eq!(effective_level(LogLevel::Warn, false), LogLevel::Warn);
    }

    #[test]
    fn test_verbose_raises_quiet_levels() {
        assert_eq!(effective_level(LogLevel::Info, true), LogLevel::Debug);
        assert_eq!(effective_level(LogLevel::Error, true), LogLevel::Debug);
        assert_eq!(effective_level(LogLevel::Trace, true), LogLevel::Trace);
    }

    #[test]
    fn test_development_preset_level_survives() {
        let config = EngineConfig::for_environment("development");
        assert_eq!(effective_level(config.logging.level, false), LogLevel::Debug);
    }
}
