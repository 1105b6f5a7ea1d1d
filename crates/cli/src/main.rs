//! Container Actions exporter
//!
//! Pulls pending actions and Kubernetes pod groups from Turbonomic,
//! correlates them, and writes one JSON report per run.

mod config;
mod output;

use actions_lib::{
    collect_container_actions, ClientConfig, CorrelatedRecord, PipelineOptions, StructuredLogger,
    TurboClient,
};
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Container Actions exporter
///
/// Reads TURBO_URL, TURBO_USERNAME, TURBO_PASSWORD, POD_SEARCH_QUERY and
/// POD_GROUPS_TO_EXCLUDE from the environment.
#[derive(Parser)]
#[command(name = "container-actions")]
#[command(
    author,
    version,
    about = "Export pending Turbonomic actions for Kubernetes pod groups"
)]
pub struct Cli {
    /// Report file path (overrides OUTPUT_FILENAME)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Format of the summary printed after the report is written
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Do not print a summary
    #[arg(long, short)]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration problems are reported before any network activity
    let settings = match config::Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            output::print_error(&format!("Error - {}", e));
            std::process::exit(1);
        }
    };

    init_tracing(cli.log_json, settings.debug);

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| settings.output_path.clone());
    let logger = StructuredLogger::new(&settings.base_url);

    let records = match run(&settings, &logger, &output_path).await {
        Ok(records) => records,
        Err(e) => {
            logger.log_failure(&e);
            return Err(e);
        }
    };

    if !cli.quiet {
        output::print_summary(&records, &output_path, cli.format);
    }

    Ok(())
}

/// Log in, run the pipeline and write the report.
/// Nothing is written unless every step succeeds.
async fn run(
    settings: &config::Settings,
    logger: &StructuredLogger,
    output_path: &Path,
) -> Result<Vec<CorrelatedRecord>> {
    logger.log_startup(
        VERSION,
        settings.excluded_groups.len(),
        settings.group_concurrency,
    );

    let client_config =
        ClientConfig::new(&settings.base_url).with_request_timeout(settings.request_timeout);
    let client = TurboClient::login(&client_config, &settings.credentials).await?;
    logger.log_authenticated(&settings.credentials.username);

    let options = PipelineOptions::new(
        settings.search_query.clone(),
        settings.excluded_groups.clone(),
    )
    .with_concurrency(settings.group_concurrency);

    let records = collect_container_actions(&client, &options).await?;

    debug!(path = %output_path.display(), records = records.len(), "Writing report");
    output::write_report(output_path, &records).await?;
    logger.log_report_written(output_path, &records);

    Ok(records)
}

fn init_tracing(json: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("info,actions_lib=debug,container_actions=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
