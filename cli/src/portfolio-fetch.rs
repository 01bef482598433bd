//! # Portfolio Fetch
//!
//! Fetches the portfolio collection from the configured API, validates it and
//! prints the items as JSON. With `--health` it only probes the API.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use lib_portfolio::configs::config_portfolio::{
    load_dotenv, ENV_BACKOFF_MULTIPLIER, ENV_BASE_DELAY_MS, ENV_BASE_URL, ENV_ITEMS_PATH, ENV_MAX_RETRIES, ENV_TIMEOUT_SECS,
};
use lib_portfolio::{
    init_logging, is_valid_category, FetchError, LoggingOptions, PortfolioConfig, PortfolioItem,
};

/// Fetch and validate portfolio items from a remote JSON endpoint.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Fetches the portfolio collection from {base-url}/items, retrying transient failures with exponential backoff, validates every item and prints the result as JSON. Invalid payloads are rejected as a whole."
)]
struct Args {
    /// Base URL of the portfolio API.
    #[arg(long, env = ENV_BASE_URL)]
    base_url: Option<String>,

    /// JSON configuration file (camelCase keys). Flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Collection path relative to the base URL.
    #[arg(long, env = ENV_ITEMS_PATH)]
    path: Option<String>,

    /// Retries after the first failed attempt.
    #[arg(long, env = ENV_MAX_RETRIES)]
    max_retries: Option<u32>,

    /// Delay before the first retry, in milliseconds.
    #[arg(long, env = ENV_BASE_DELAY_MS)]
    base_delay_ms: Option<u64>,

    /// Factor applied to the delay after each retry.
    #[arg(long, env = ENV_BACKOFF_MULTIPLIER)]
    backoff_multiplier: Option<u32>,

    /// Per-attempt timeout, in seconds.
    #[arg(long, env = ENV_TIMEOUT_SECS)]
    timeout_secs: Option<u64>,

    /// Only print items of this category.
    #[arg(long)]
    category: Option<String>,

    /// Only print featured items.
    #[arg(long)]
    featured: bool,

    /// Output minified JSON (without pretty-printing).
    #[arg(short, long)]
    minify: bool,

    /// Only check whether the API is up.
    #[arg(long)]
    health: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log as JSON lines.
    #[arg(long)]
    log_json: bool,
}

/// Merges the config file (if any) with flag and environment overrides.
fn resolve_config(args: &Args) -> Result<PortfolioConfig> {
    let mut config = match (&args.config, &args.base_url) {
        (Some(file), _) => PortfolioConfig::from_json_file(file)
            .with_context(|| format!("Failed to load configuration from {}", file.display()))?,
        (None, Some(base_url)) => PortfolioConfig::new(base_url.clone()),
        (None, None) => anyhow::bail!("No API base URL: pass --base-url, set {} or use --config", ENV_BASE_URL),
    };

    if let (Some(_), Some(base_url)) = (&args.config, &args.base_url) {
        config.base_url = base_url.clone();
    }
    if let Some(path) = &args.path {
        config.items_path = path.clone();
    }
    if let Some(max_retries) = args.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(base_delay_ms) = args.base_delay_ms {
        config.retry.base_delay_ms = base_delay_ms;
    }
    if let Some(multiplier) = args.backoff_multiplier {
        config.retry.multiplier = multiplier;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }

    config.validate()?;
    Ok(config)
}

/// Applies the `--category` and `--featured` filters, keeping order.
fn select_items(items: Vec<PortfolioItem>, category: Option<&str>, featured_only: bool) -> Vec<PortfolioItem> {
    items
        .into_iter()
        .filter(|item| category.is_none_or(|c| item.category == c))
        .filter(|item| !featured_only || item.featured)
        .collect()
}

fn render(items: &[PortfolioItem], minify: bool) -> Result<String> {
    let json = if minify {
        serde_json::to_string(items)?
    } else {
        serde_json::to_string_pretty(items)?
    };
    Ok(json)
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = resolve_config(&args)?;
    let api = config.api()?;

    if args.health {
        let healthy = api.check_api_health().await;
        println!("{}", if healthy { "up" } else { "down" });
        return Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    if let Some(category) = args.category.as_deref() {
        if !is_valid_category(category) {
            warn!("Category {:?} is not one of the known categories", category);
        }
    }

    let items = match api.fetch_portfolio_items(None).await {
        Ok(items) => items,
        Err(err @ FetchError::Api { .. }) => {
            eprintln!("Could not reach the portfolio API. Check your connection and try again.");
            eprintln!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let selected = select_items(items, args.category.as_deref(), args.featured);
    info!("Printing {} portfolio item(s)", selected.len());
    println!("{}", render(&selected, args.minify)?);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env files must be loaded before clap reads its env fallbacks.
    load_dotenv();
    let args = Args::parse();

    let logging = LoggingOptions {
        level: args.log_level.clone(),
        json: args.log_json,
        ..LoggingOptions::default()
    };
    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
