//! Tick loop driver: snapshot assembly and intent placement.
//!
//! The runner owns the feed/gateway handles and the engine. Each tick it
//! assembles a [`TickSnapshot`], lets the engine decide, and places the
//! resulting intents. Read failures fail open: a book that cannot be
//! fetched leaves its ticker bidless for the tick, and a failed resting
//! or position read skips the whole tick, since quoting blind against a
//! stale order list could double up a key.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::market::{MarketDataFeed, OrderGateway};
use crate::metrics;
use crate::quoting::engine::{QuoteEngine, QuoteIntent, TickSnapshot};
use crate::trading::OrderRequest;

/// Drives the decision engine against live collaborators.
pub struct QuoteRunner {
    engine: QuoteEngine,
    feed: Arc<dyn MarketDataFeed>,
    gateway: Arc<dyn OrderGateway>,
    dry_run: bool,
}

impl QuoteRunner {
    /// Create a runner.
    pub fn new(
        engine: QuoteEngine,
        feed: Arc<dyn MarketDataFeed>,
        gateway: Arc<dyn OrderGateway>,
        dry_run: bool,
    ) -> Self {
        Self {
            engine,
            feed,
            gateway,
            dry_run,
        }
    }

    /// The engine, for stats and mode inspection.
    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Run one full tick: snapshot, evaluate, place. Returns the intents
    /// the engine emitted (placed, or merely logged in dry-run mode).
    #[instrument(skip(self))]
    pub async fn tick_once(&mut self) -> Vec<QuoteIntent> {
        let _timer = metrics::timer_tick();

        let Some(snapshot) = self.assemble_snapshot().await else {
            return Vec::new();
        };

        let intents = self.engine.evaluate(&snapshot);
        for intent in &intents {
            self.place(intent).await;
        }
        intents
    }

    /// Gather books, resting orders, and positions into one snapshot.
    ///
    /// Returns `None` when the resting-order or position read fails; those
    /// two are load-bearing for the safety guards.
    async fn assemble_snapshot(&self) -> Option<TickSnapshot> {
        let tickers: Vec<String> = self
            .engine
            .modes()
            .map(|(ticker, _)| ticker.to_string())
            .collect();

        let mut snapshot = TickSnapshot::new();

        for ticker in tickers {
            match self.feed.orderbook(&ticker).await {
                Ok(book) => {
                    snapshot.books.insert(ticker, book);
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Book fetch failed, skipping ticker this tick");
                }
            }
        }

        snapshot.resting = match self.feed.resting_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                warn!(error = %e, "Resting-order fetch failed, skipping tick");
                return None;
            }
        };

        snapshot.positions = match self.feed.positions().await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "Position fetch failed, skipping tick");
                return None;
            }
        };

        Some(snapshot)
    }

    async fn place(&self, intent: &QuoteIntent) {
        if self.dry_run {
            info!(
                ticker = %intent.ticker,
                leg = %intent.leg,
                price = intent.price,
                quantity = intent.quantity,
                "DRY RUN: would place quote"
            );
            return;
        }

        let request =
            OrderRequest::limit_buy(&intent.ticker, intent.leg, intent.price, intent.quantity);
        match self.gateway.place_order(&request).await {
            Ok(placed) => {
                info!(order_id = %placed.order_id, price = intent.price, "Quote placed");
                metrics::inc_quotes_placed();
            }
            Err(e) => {
                // No retry within the tick; the pending window expires and
                // the next tick re-evaluates from scratch.
                warn!(ticker = %intent.ticker, leg = %intent.leg, error = %e, "Quote placement failed");
                metrics::inc_quote_failures();
            }
        }
    }
}
