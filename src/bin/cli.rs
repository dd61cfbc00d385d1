//! shopscout CLI
//!
//! Runs the HTTP service, or a single scrape from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopscout::{
    error::Result,
    models::{Config, SelectorConfig},
    pipeline::ScrapePipeline,
    server,
};

/// shopscout - storefront search scraper
#[derive(Parser, Debug)]
#[command(name = "shopscout", version, about = "Storefront search scraper API")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scrape one keyword and print the JSON report
    Scrape {
        /// Search keyword
        keyword: String,

        /// Print every extracted listing instead of the first `max_results`
        #[arg(long)]
        all: bool,
    },

    /// Validate configuration and selectors
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        let config = Config::load_or_default(&cli.config);
        log::info!("Loaded configuration from {}", cli.config.display());
        config
    } else {
        log::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };
    config.apply_env();

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let pipeline = ScrapePipeline::from_config(&config)?;
            server::serve(&config.server, pipeline).await?;
        }

        Command::Scrape { keyword, all } => {
            config.validate()?;

            let pipeline = ScrapePipeline::from_config(&config)?;
            let limit = if all { None } else { Some(pipeline.max_results()) };
            let report = pipeline.run_with_limit(&keyword, limit).await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let defaults = SelectorConfig::default();
            for (name, chain) in config.selectors.chains() {
                let marker = if defaults.chains().iter().any(|(n, c)| *n == name && *c == chain) {
                    "default"
                } else {
                    "custom"
                };
                log::info!("  selectors.{}: {} candidates ({})", name, chain.len(), marker);
            }
            log::info!(
                "  search: {} (timeout {}s, max {} results)",
                config.scraper.search_url_for("example"),
                config.scraper.timeout_secs,
                config.scraper.max_results
            );

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
