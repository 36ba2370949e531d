mod commands;
mod orchestrator;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "locscrape-cli")]
#[command(about = "Scrape store-locator listings and phone numbers into CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one or more sites (all sites when no --site is given)
    Run {
        /// Site identifier or domain; repeat for several sites
        #[arg(long = "site", value_name = "ID")]
        sites: Vec<String>,
        /// Look up a phone number for every location on Google Maps
        #[arg(long)]
        phones: bool,
        /// Look up phones for at most N locations per site
        #[arg(long, value_name = "N", requires = "phones")]
        phone_limit: Option<usize>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// Print the plan without launching a browser
        #[arg(long)]
        dry_run: bool,
    },
    /// List supported sites
    Sites,
    /// Add phone numbers to an existing locations CSV
    Enrich {
        /// CSV with at least Name and Address columns
        #[arg(long, value_name = "CSV")]
        input: PathBuf,
        /// Defaults to `<input stem>_with_phones.csv` next to the input
        #[arg(long, value_name = "CSV")]
        output: Option<PathBuf>,
        /// Look up at most N rows
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = locscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let table = locscrape_core::load_site_table(config.sites_path.as_deref())?;

    match cli.command {
        Commands::Run {
            sites,
            phones,
            phone_limit,
            headful,
            dry_run,
        } => {
            let options = commands::RunOptions {
                sites,
                phones,
                phone_limit,
                headful,
                dry_run,
            };
            commands::run_scrape(&config, &table, &options).await?;
        }
        Commands::Sites => commands::list_sites(&table),
        Commands::Enrich {
            input,
            output,
            limit,
            headful,
        } => {
            commands::run_enrich(&config, &input, output.as_deref(), limit, headful).await?;
        }
    }

    Ok(())
}
