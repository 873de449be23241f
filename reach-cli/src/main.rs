mod display;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reach_core::colors::CatppuccinExt;
use reach_core::output::OutputFormat;
use reach_core::{BulkExecutor, ErrorResponse, ReachError, ReachabilityProber, Resolution};
use tracing_subscriber::EnvFilter;

use crate::display::{BulkProgress, ProgressWriterFactory, Spinner};

#[derive(Parser)]
#[command(name = "reach")]
#[command(about = "Domain reachability checker - DNS resolution plus HTTP and HTTPS probes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human or json)
    #[arg(short, long, global = true, default_value = "human")]
    format: String,

    #[command(flatten)]
    probe: ProbeArgs,
}

#[derive(Args)]
struct ProbeArgs {
    /// Timeout for each HTTP probe, in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    /// TCP connect timeout for each HTTP probe, in milliseconds
    #[arg(long, global = true, default_value_t = 3000)]
    connect_timeout_ms: u64,

    /// Maximum number of redirects to follow
    #[arg(long, global = true, default_value_t = 10)]
    max_redirects: usize,

    /// Nameserver to resolve with instead of the system resolver (e.g., @8.8.8.8)
    #[arg(short = 's', long, global = true)]
    nameserver: Option<String>,
}

impl ProbeArgs {
    fn build(&self) -> reach_core::Result<ReachabilityProber> {
        let mut prober = ReachabilityProber::new()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_max_redirects(self.max_redirects);

        if let Some(ns) = &self.nameserver {
            prober = prober.with_resolution(Resolution::nameserver(ns)?);
        }

        Ok(prober)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check DNS resolution and HTTP/HTTPS reachability of a domain
    Check {
        /// Domain name or URL (scheme and path are stripped)
        domain: String,
    },
    /// Check every domain listed in a file
    Bulk {
        /// File containing domains: one per line, # for comments, or CSV (uses first column)
        file: String,
        /// Number of domains checked at once
        #[arg(short, long, default_value_t = 10)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(ProgressWriterFactory)
        .init();

    let cli = Cli::parse();

    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    let prober = match cli.probe.build() {
        Ok(prober) => prober,
        Err(e) => exit_with_error(&e, output_format),
    };

    execute_command(cli.command, output_format, prober).await
}

async fn execute_command(
    command: Commands,
    output_format: OutputFormat,
    prober: ReachabilityProber,
) -> anyhow::Result<()> {
    let formatter = reach_core::output::get_formatter(output_format);
    let interactive = output_format == OutputFormat::Human;

    match command {
        Commands::Check { domain } => {
            let spinner = interactive.then(|| Spinner::checking(&domain, prober.timeout()));
            let result = prober.check_raw(&domain).await;
            if let Some(spinner) = spinner {
                spinner.finish(result.is_ok());
            }

            match result {
                Ok(report) => {
                    println!("{}", formatter.format_report(&report));
                }
                Err(e) => exit_with_error(&e, output_format),
            }
        }
        Commands::Bulk { file, concurrency } => {
            let content = std::fs::read_to_string(&file)?;
            let domains = reach_core::bulk::parse_domains_from_file(&content);

            if domains.is_empty() {
                eprintln!(
                    "{} No domains found in file. Expected format: one domain per line, # for comments, or CSV (first column)",
                    "Error:".ctp_red()
                );
                std::process::exit(2);
            }

            let executor = BulkExecutor::new()
                .with_concurrency(concurrency)
                .with_prober(prober);

            let results = if interactive {
                let progress = BulkProgress::new(domains.len());
                executor.execute(domains, Some(progress.callback())).await
            } else {
                executor.execute(domains, None).await
            };

            println!("{}", formatter.format_bulk(&results));
        }
    }

    Ok(())
}

/// Reports a rejected request and exits: 2 for caller input errors, 1 otherwise.
fn exit_with_error(error: &ReachError, output_format: OutputFormat) -> ! {
    match output_format {
        OutputFormat::Json => match serde_json::to_string(&ErrorResponse::from(error)) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("Error: {}", error),
        },
        OutputFormat::Human => eprintln!("{} {}", "Error:".ctp_red(), error),
    }

    std::process::exit(if error.is_client_error() { 2 } else { 1 });
}
