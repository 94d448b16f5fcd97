// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn them into a crawl configuration (and load the ignore list)
// 3. Plug in the reporters: console output, Slack webhook
// 4. Run the crawl until every reachable link has been checked
// 5. Exit with the proper code (0 = crawl finished, 1 = bad configuration,
//    2 = unexpected error)
//
// Broken links do not change the exit code: finding them is the normal
// outcome of a crawl, not a failure of the program.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - resolving, extracting and fetching single links
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated crawl configuration
mod crawl; // src/crawl/ - the crawl engine
mod error; // src/error.rs - typed errors
mod report; // src/report/ - console and Slack output

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, Crawler};
use error::ConfigError;
use report::{ConsoleReporter, Reporters, SlackReporter};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<ConfigError>() {
            Some(config_error) => {
                eprintln!("❌ ERROR: {}", config_error);
                1
            }
            None => {
                eprintln!("Error: {:#}", e);
                2
            }
        },
    };

    std::process::exit(exit_code);
}

// Diagnostics go to stderr so they never mix with the report on stdout.
// RUST_LOG overrides the default level, e.g. RUST_LOG=octoprobe=debug
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("octoprobe=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Arc::new(CrawlConfig::from_cli(&cli)?);

    // With --json, stdout is reserved for the final JSON document
    let mut reporters = Reporters::new();
    if !cli.json {
        reporters = reporters.with(ConsoleReporter::new());
    }
    if let Some(webhook) = &cli.slack_webhook {
        let slack = SlackReporter::new(webhook.as_str()).context("Failed to create Slack client")?;
        reporters = reporters.with(slack);
    }

    info!(
        "Crawling {} (timeout {:?}, concurrency {})",
        config.base, config.timeout, config.concurrency
    );

    let mut crawler = Crawler::new(Arc::clone(&config), reporters)
        .context("Failed to create HTTP client")?
        .with_cancellation(cancel_on_ctrl_c());

    let report = crawler.run().await;

    if cli.json {
        print_json(&report)?;
    }

    Ok(0)
}

// First Ctrl+C stops taking new links; requests in flight still finish and
// the summary is printed as usual.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl+C, finishing requests in flight...");
            let _ = cancel_tx.send(true);
        }
    });

    cancel_rx
}

fn print_json(report: &CrawlReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    println!("{}", json_output);
    Ok(())
}
