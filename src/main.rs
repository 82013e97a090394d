//! Low-priced equity alert bot entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use penny_alert::config::Config;
use penny_alert::market::MarketDataClient;
use penny_alert::metrics;
use penny_alert::notify::{Notifier, TelegramNotifier};
use penny_alert::poller::Poller;
use penny_alert::scanner::{scan_ticker, ScanParams};
use penny_alert::universe::{build_universe, UniverseParams};

/// Low-priced equity volume/RSI alert bot.
#[derive(Parser, Debug)]
#[command(name = "penny-alert")]
#[command(about = "Scans low-priced equities for volume spikes and RSI extremes and alerts on Telegram")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the polling loop (default).
    Run,

    /// Check configuration validity.
    CheckConfig,

    /// Build the universe once and print it.
    Universe {
        /// Override the number of listing symbols probed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Scan tickers once and print any alerts.
    Scan {
        /// Ticker symbols.
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Also send alerts to Telegram.
        #[arg(long)]
        notify: bool,
    },

    /// Send one message to the configured chat.
    Notify {
        /// Message text.
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is read once, here, and passed down explicitly
    let config = Config::load();

    let (verbose, json) = match &config {
        Ok(c) => (args.verbose || c.verbose, c.log_json),
        Err(_) => (args.verbose, false),
    };
    init_tracing(verbose, json);

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Universe { limit }) => cmd_universe(config, limit).await,
        Some(Command::Scan { tickers, notify }) => cmd_scan(&config, &tickers, notify).await,
        Some(Command::Notify { message }) => cmd_notify(&config, &message).await,
        Some(Command::Run) | None => cmd_run(config).await,
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("penny_alert=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PENNY ALERT BOT - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate_for_notify() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Telegram Token: {}", config.masked_token());
    println!("  Chat ID: {}", config.chat_id);
    for url in &config.listing_urls {
        println!("  Listing: {}", url);
    }
    println!("  Market Data: {}", config.market_data_url);
    println!("  Price Ceiling: ${}", config.price_ceiling);
    println!("  Candidate Limit: {}", config.universe_candidate_limit);
    println!("  Batch Size: {}", config.scan_batch_size);
    println!("  History Range: {}", config.history_range);
    println!("  RSI Period: {}", config.rsi_period);
    println!("  Volume Spike: >{}x mean", config.volume_spike_multiplier);
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    println!("  Universe Refresh: {}s", config.universe_refresh_secs);
    println!(
        "  Scan Budget: {}",
        match config.scan_budget() {
            Some(budget) => format!("{}s", budget.as_secs()),
            None => "unbounded".to_string(),
        }
    );
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Build the universe once.
async fn cmd_universe(mut config: Config, limit: Option<usize>) -> anyhow::Result<()> {
    if let Some(limit) = limit {
        config.universe_candidate_limit = limit;
    }
    config.validate()?;

    let client = MarketDataClient::new(&config)?;
    let universe = build_universe(&client, &UniverseParams::from(&config)).await?;

    println!("======================================================================");
    println!(
        "UNIVERSE: {} of {} probed symbols under ${} ({} lookups failed)",
        universe.len(),
        universe.probed,
        config.price_ceiling,
        universe.failed
    );
    println!("======================================================================");
    for ticker in &universe.tickers {
        println!("{}", ticker);
    }

    Ok(())
}

/// Scan tickers once.
async fn cmd_scan(config: &Config, tickers: &[String], notify: bool) -> anyhow::Result<()> {
    if notify {
        config.validate_for_notify()?;
    } else {
        config.validate()?;
    }

    let client = MarketDataClient::new(config)?;
    let notifier = if notify {
        Some(TelegramNotifier::new(config)?)
    } else {
        None
    };
    let params = ScanParams::from(config);

    for ticker in tickers {
        match scan_ticker(&client, ticker, &params).await {
            Ok(Some(alert)) => {
                println!("{}", alert);
                if let Some(notifier) = &notifier {
                    if let Err(e) = notifier.send(&alert.to_string()).await {
                        error!(error = %e, "❌ Notification failed");
                    }
                }
            }
            Ok(None) => println!("{}: no conditions met", ticker),
            Err(e) => warn!(ticker = %ticker, error = %e, "❌ Error scanning ticker"),
        }
    }

    Ok(())
}

/// Send one message.
async fn cmd_notify(config: &Config, message: &str) -> anyhow::Result<()> {
    config.validate_for_notify()?;

    let notifier = TelegramNotifier::new(config)?;
    notifier.send(message).await?;
    info!(chat_id = %notifier.chat_id(), "Message sent");

    Ok(())
}

/// Run the polling loop.
async fn cmd_run(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate_for_notify() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if config.metrics_enabled {
        metrics::install_exporter(config.metrics_port).map_err(|e| anyhow::anyhow!(e))?;
    }

    info!("Configuration loaded successfully");
    info!("Price ceiling: ${}", config.price_ceiling);
    info!(
        "Batch: {} tickers every {}s, universe refresh every {}s",
        config.scan_batch_size, config.poll_interval_secs, config.universe_refresh_secs
    );

    let client = MarketDataClient::new(&config)?;
    let notifier = TelegramNotifier::new(&config)?;

    info!("Starting alert bot...");
    Poller::new(&config, client, notifier).run().await;

    Ok(())
}
