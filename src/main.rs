//! Kalshi penny-quoting bot entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kalshi_quoter::api::{create_router, AppState};
use kalshi_quoter::config::Config;
use kalshi_quoter::market::{KalshiClient, Leg};
use kalshi_quoter::metrics;
use kalshi_quoter::orderbook::{price_sweep, BookView};
use kalshi_quoter::quoting::{QuoteEngine, QuoteRunner};
use kalshi_quoter::trading::{cancel_all, execute_sweep};
use kalshi_quoter::utils::shutdown_signal;

/// Kalshi penny-quoting bot.
#[derive(Parser, Debug)]
#[command(name = "kalshi-quoter")]
#[command(about = "Automated passive quoting bot for Kalshi binary markets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Run in dry-run mode (no real orders).
    #[arg(long)]
    dry_run: Option<bool>,

    /// HTTP server port for health/metrics.
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the main quoting loop (default).
    Run {
        /// Run in dry-run mode (no real orders).
        #[arg(long)]
        dry_run: Option<bool>,

        /// HTTP server port for health/metrics.
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Override QUOTE_TICKERS, e.g. "INXD-26AUG:yes,FED-CUT".
        #[arg(long)]
        tickers: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check account balance and connection.
    CheckBalance,

    /// Show the derived book view for a market.
    Book {
        /// Market ticker.
        ticker: String,
    },

    /// Buy all resting liquidity on a leg ("max bet").
    Sweep {
        /// Market ticker.
        ticker: String,

        /// Leg to buy: yes or no.
        leg: Leg,
    },

    /// Cancel every resting order.
    CancelAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("kalshi_quoter=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckBalance) => cmd_check_balance().await,
        Some(Command::Book { ticker }) => cmd_book(&ticker).await,
        Some(Command::Sweep { ticker, leg }) => cmd_sweep(&ticker, leg).await,
        Some(Command::CancelAll) => cmd_cancel_all().await,
        Some(Command::Run {
            dry_run,
            port,
            tickers,
        }) => cmd_run(dry_run, port, tickers).await,
        None => cmd_run(args.dry_run, args.port, None).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("KALSHI QUOTER - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  API Base: {}", config.kalshi_api_base);
    println!(
        "  API Key: {}",
        if config.kalshi_api_key.is_some() {
            "present"
        } else {
            "not set"
        }
    );

    let modes = config.quote_modes().map_err(|e| anyhow::anyhow!(e))?;
    if modes.is_empty() {
        println!("  WARNING: QUOTE_TICKERS is empty, the run loop will quote nothing!");
    } else {
        println!("  Quoted Markets:");
        for (ticker, mode) in &modes {
            println!("    - {} ({})", ticker, mode);
        }
    }

    println!("  Max Bid Price: {}c", config.max_bid_price);
    println!("  Min Depth At Best: {} contracts", config.min_depth_at_best);
    println!("  Position Limit: {} contracts", config.position_limit);
    println!("  Quote Size: {} contracts", config.quote_size);
    println!("  Pending Grace: {}ms", config.pending_grace_ms);
    println!("  Tick Interval: {}ms", config.tick_interval_ms);
    println!("  Dry Run: {}", config.dry_run);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Check account balance and connection.
async fn cmd_check_balance() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("KALSHI QUOTER - BALANCE CHECK");
    println!("======================================================================");

    // Load configuration
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("Host: {}", config.kalshi_api_base);
    println!(
        "API Key: {}",
        if config.kalshi_api_key.is_some() {
            "present"
        } else {
            "not set"
        }
    );
    println!("======================================================================");

    // Create client
    print!("\n1. Creating client... ");
    let client = KalshiClient::new(&config);
    println!("OK");

    // Get balance
    print!("\n2. Getting balance... ");
    match client.balance().await {
        Ok(balance) => {
            println!("OK");
            println!("   Cash: ${}", Decimal::new(balance.balance, 2));
            if let Some(value) = balance.portfolio_value {
                println!("   Portfolio Value: ${}", Decimal::new(value, 2));
            }
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    // Get positions
    print!("\n3. Getting positions... ");
    use kalshi_quoter::market::MarketDataFeed;
    match client.positions().await {
        Ok(positions) => {
            println!("OK");
            println!("   Markets with positions: {}", positions.len());
            for (ticker, contracts) in positions.iter().take(5) {
                let side = if contracts >= 0 { "yes" } else { "no" };
                println!("   - {}: {} ({} long)", ticker, contracts, side);
            }
            if positions.len() > 5 {
                println!("   ... and {} more", positions.len() - 5);
            }
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    println!("\n======================================================================");
    println!("BALANCE CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Show the derived book view for a market.
async fn cmd_book(ticker: &str) -> anyhow::Result<()> {
    use kalshi_quoter::market::MarketDataFeed;

    let config = Config::load()?;
    let client = KalshiClient::new(&config);

    println!("======================================================================");
    println!("KALSHI QUOTER - BOOK VIEW: {}", ticker);
    println!("======================================================================");

    let book = client.orderbook(ticker).await?;
    let view = BookView::from_book(&book);

    for leg in [Leg::Yes, Leg::No] {
        let side = view.side(leg);
        println!("\n{} leg:", leg.to_string().to_uppercase());
        match (side.derived.best_bid, side.derived.best_ask) {
            (Some(bid), Some(ask)) => println!(
                "  Best Bid: {}c  Best Ask: {}c  Spread: {}c",
                bid,
                ask,
                side.derived.spread.unwrap_or(0)
            ),
            (Some(bid), None) => println!("  Best Bid: {}c  Best Ask: -", bid),
            (None, Some(ask)) => println!("  Best Bid: -  Best Ask: {}c", ask),
            (None, None) => println!("  (empty)"),
        }

        println!("  Bids (price x qty, cumulative):");
        for level in side.bids.iter().take(10) {
            println!(
                "    {:>3}c x {:>6}  ({:>6})",
                level.price, level.quantity, level.cumulative
            );
        }
        println!("  Asks (price x qty, cumulative):");
        for level in side.asks.iter().take(10) {
            println!(
                "    {:>3}c x {:>6}  ({:>6})",
                level.price, level.quantity, level.cumulative
            );
        }
    }

    println!("\n======================================================================");
    Ok(())
}

/// Buy all resting liquidity on a leg.
async fn cmd_sweep(ticker: &str, leg: Leg) -> anyhow::Result<()> {
    use kalshi_quoter::market::MarketDataFeed;

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    let client = Arc::new(KalshiClient::new(&config));

    println!("======================================================================");
    println!("KALSHI QUOTER - SWEEP: {} {}", ticker, leg);
    println!("======================================================================");

    if config.dry_run {
        // Price only; DRY_RUN=false is required to actually trade.
        let book = client.orderbook(ticker).await?;
        let quote = price_sweep(ticker, leg, book.bids(leg.opposite()))?;
        println!("DRY RUN - would buy:");
        println!("  Quantity: {} contracts", quote.quantity);
        println!("  Weighted Avg Price: {}c", quote.average_price);
        println!(
            "  Approx Cost: ${}",
            Decimal::new(i64::from(quote.quantity) * i64::from(quote.average_price), 2)
        );
    } else {
        let report = execute_sweep(client.as_ref(), client.as_ref(), ticker, leg).await?;
        println!("SWEEP EXECUTED");
        println!("  Order ID: {}", report.order_id);
        println!("  Quantity: {} contracts", report.quantity);
        println!("  Weighted Avg Price: {}c", report.average_price);
    }

    println!("======================================================================");
    Ok(())
}

/// Cancel every resting order.
async fn cmd_cancel_all() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    let client = Arc::new(KalshiClient::new(&config));

    println!("======================================================================");
    println!("KALSHI QUOTER - CANCEL ALL");
    println!("======================================================================");

    let summary = cancel_all(client.as_ref(), client.as_ref()).await?;
    println!("Cancelled: {}", summary.cancelled);
    if !summary.is_clean() {
        println!("Failed: {}", summary.failed.len());
        for (order_id, reason) in &summary.failed {
            println!("  - {}: {}", order_id, reason);
        }
    }
    println!("======================================================================");

    Ok(())
}

/// Run the main quoting loop.
async fn cmd_run(
    dry_run_override: Option<bool>,
    port: u16,
    tickers_override: Option<String>,
) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(dry_run) = dry_run_override {
        config.dry_run = dry_run;
    }
    if let Some(tickers) = tickers_override {
        config.quote_tickers = Some(tickers);
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let modes = config.quote_modes().map_err(|e| anyhow::anyhow!(e))?;
    if modes.is_empty() {
        return Err(anyhow::anyhow!(
            "QUOTE_TICKERS is empty - nothing to quote"
        ));
    }

    info!("Configuration loaded successfully");
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("Quote size: {} contracts", config.quote_size);
    info!("Tick interval: {}ms", config.tick_interval_ms);

    // Install the Prometheus recorder before any metric is touched
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Create app state
    let tickers: Vec<String> = modes.iter().map(|(t, _)| t.clone()).collect();
    let app_state = AppState::new(config.dry_run, tickers).with_metrics(prometheus);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());

    // Spawn HTTP server
    let _server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    // Create venue client and runner
    let client = Arc::new(KalshiClient::new(&config));
    let engine = QuoteEngine::new(config.policy(), modes.clone());
    let mut runner = QuoteRunner::new(engine, client.clone(), client, config.dry_run);

    info!("========================================");
    info!("KALSHI QUOTER STARTED");
    info!("========================================");
    for (ticker, mode) in &modes {
        info!("Market: {} ({})", ticker, mode);
    }
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("========================================");

    app_state.set_ready(true);

    // Main tick loop
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let intents = runner.tick_once().await;
                if !intents.is_empty() {
                    info!("Tick placed {} quote(s)", intents.len());
                }
                *app_state.stats.write().await = runner.engine().stats();
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    // Final summary
    app_state.set_ready(false);
    let stats = runner.engine().stats();
    info!("========================================");
    info!("SHUTDOWN - FINAL SUMMARY");
    info!("========================================");
    info!("Ticks evaluated: {}", stats.ticks);
    info!("Quotes emitted: {}", stats.quotes_emitted);
    info!("Evaluations vetoed: {}", stats.vetoes);
    info!("========================================");

    if !config.dry_run {
        warn!("Resting quotes are left on the book; run `kalshi-quoter cancel-all` to pull them");
    }

    Ok(())
}
