use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use core_smap::common::db_env::get_db_pool;
use core_smap::common::deadline::run_deadline;
use core_smap::common::destination_config::DestinationConfig;
use core_smap::{BaseUrl, PgSource, SitemapSource, SnapshotSource, setup_logging};
use cron_smap::{DEFAULT_LOG_SETTINGS, Error, RunOptions, run_with_deadline};

#[derive(Parser)]
#[command(name = "cron-smap")]
#[command(about = "Regenerates and publishes the catalog sitemap set", long_about = None)]
struct Cli {
    /// Public site URL. Overrides the 'site_url' setting.
    #[arg(long, value_parser = validate_base_url)]
    base_url: Option<String>,

    /// Read the catalog from a JSON snapshot instead of DATABASE_URL.
    #[arg(long, value_parser = validate_input_file)]
    snapshot: Option<PathBuf>,

    /// Directory for the filesystem destination. Overrides SITEMAP_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Build, render and verify everything, but publish nothing.
    #[arg(long)]
    dry_run: bool,
}

fn validate_base_url(s: &str) -> Result<String, String> {
    BaseUrl::new(s).map(|_| s.to_string()).map_err(|e| e.to_string())
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file., if it exists
    dotenvy::dotenv().ok();

    setup_logging(DEFAULT_LOG_SETTINGS);

    let cli = Cli::parse();

    match generate(cli).await {
        Ok(summary) => {
            tracing::info!("Sitemap run succeeded: {}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Sitemap run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn generate(cli: Cli) -> Result<cron_smap::RunSummary, Error> {
    let deadline = run_deadline()?;
    let destination = DestinationConfig::from_env(cli.output_dir)?.into_destination()?;

    let source: Box<dyn SitemapSource> = match &cli.snapshot {
        Some(path) => {
            tracing::info!("Reading catalog from snapshot {}", path.display());
            let snapshot = SnapshotSource::from_file(path)
                .await
                .map_err(|e| Error::ConfigError(format!("Cannot load snapshot {}: {}", path.display(), e)))?;
            Box::new(snapshot)
        }
        None => Box::new(PgSource::new(get_db_pool().await?)),
    };

    let options = RunOptions {
        base_url: cli.base_url,
        dry_run: cli.dry_run,
        generated_at: None,
    };

    tracing::info!(
        "Publishing to {} (deadline {}s)",
        destination.describe(),
        deadline.as_secs()
    );
    run_with_deadline(source.as_ref(), destination.as_ref(), &options, deadline).await
}
