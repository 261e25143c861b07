//! Page Expiry CLI
//!
//! Local entry point: processes one analytics export against the sites and
//! mappings declared in the configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use page_expiry::{
    error::Result,
    models::{Config, PageRecord, UploadedFile},
    pipeline::FileProcessor,
    services::{AlertDispatcher, LogTransport},
    storage::MemoryStore,
};

/// Page Expiry - flags stale and low-traffic pages in analytics exports
#[derive(Parser, Debug)]
#[command(
    name = "page-expiry",
    version,
    about = "Expired and low-engagement page reporting"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a spreadsheet or CSV export
    Process {
        /// Export file (.xlsx, .xls, .xlsb, .ods, .csv or .tsv)
        file: PathBuf,

        /// Write the full result as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Send an alert for every expired page
        #[arg(long)]
        send_alerts: bool,

        /// Also alert on low-engagement pages
        #[arg(long, requires = "send_alerts")]
        include_low_engagement: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Process {
            file,
            output,
            send_alerts,
            include_low_engagement,
        } => {
            config.validate()?;

            let bytes = tokio::fs::read(&file).await?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let upload = UploadedFile::new(name, bytes);

            let store = MemoryStore::from_config(&config);
            let processor = FileProcessor::new(&store, &store, &config);
            let result = processor.process_file(&upload).await?;

            log::info!("File: {}", result.file_name);
            log::info!(
                "Pages: {} total, {} expired, {} low engagement, {} over two years",
                result.total_pages,
                result.expired_pages,
                result.low_engagement_pages,
                result.pages_over_2_years
            );
            log::info!(
                "Views: {} total, {} average; average age {} days",
                result.total_page_views,
                result.average_page_views,
                result.average_page_age
            );
            log::info!(
                "Created between {} and {}",
                result.date_range.start,
                result.date_range.end
            );

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&result)?;
                tokio::fs::write(&output, json).await?;
                log::info!("Result saved to {}", output.display());
            }

            if send_alerts {
                let pages: Vec<PageRecord> = if include_low_engagement {
                    result.flagged_pages().cloned().collect()
                } else {
                    result.expired_pages_data.clone()
                };

                let transport = LogTransport;
                let report = AlertDispatcher::new(&transport, &config.alerts)
                    .send_alerts(&pages)
                    .await;
                log::info!("Alerts: {} sent, {} failed", report.sent, report.failed);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "Config OK: {} sites, {} mappings, {} column rules",
                config.sites.len(),
                config.mappings.len(),
                config.columns.len()
            );
        }
    }

    Ok(())
}
