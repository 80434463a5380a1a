//! TJPA Ingest - process enumeration crawler

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tjpa_common::logging::{init_logging, LogConfig, LogLevel};
use tjpa_common::CanonicalIdentifier;
use tjpa_ingest::config::DEFAULT_RANGE_SIZE;
use tjpa_ingest::{exit_code_for, ConsiliumClient, CrawlerConfig, EnumerationDriver};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tjpa-ingest")]
#[command(author, version, about = "TJPA process enumeration crawler")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Look up the next RANGE sequential numbers after the checkpoint
    Crawl {
        /// Number of sequential numbers to process in this run
        #[arg(short, long, default_value_t = DEFAULT_RANGE_SIZE)]
        range: u32,
    },

    /// Check the check digits of a CNJ number
    Verify {
        /// Bare (20 digits) or formatted (NNNNNNN-DD.AAAA.J.TR.OOOO) number
        identifier: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Fatal error");
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code_for(&err))
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("tjpa-ingest")
        .filter_directives("hyper=warn,reqwest=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Crawl { range } => {
            let config = CrawlerConfig::from_env()?;
            let client = ConsiliumClient::new(&config)?;
            let mut driver = EnumerationDriver::new(&config, client)?;
            let summary = driver.run(range).await?;
            info!(
                found = summary.found,
                empty = summary.empty,
                next = summary.next_sequence,
                "Crawl complete"
            );
        },
        Command::Verify { identifier } => {
            let id: CanonicalIdentifier = identifier.parse()?;
            println!("{} OK ({})", id.formatted(), id);
        },
    }

    Ok(())
}
