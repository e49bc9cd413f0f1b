//! Sweep execution and bulk cancellation.

use tracing::{info, instrument, warn};

use crate::error::BotError;
use crate::market::{Leg, MarketDataFeed, OrderGateway};
use crate::metrics;
use crate::orderbook::{price_sweep, SweepQuote};
use crate::trading::order::OrderRequest;

/// Outcome of a sweep ("max bet") execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Market ticker.
    pub ticker: String,
    /// The leg bought.
    pub leg: Leg,
    /// Contracts submitted (all fillable liquidity).
    pub quantity: u32,
    /// Advisory liquidity-weighted average ask price.
    pub average_price: u32,
    /// Venue-assigned order ID.
    pub order_id: String,
}

/// Buy all available liquidity on a leg with a single market order.
///
/// Pricing runs first: an empty opposing side refuses the sweep before any
/// placement request is issued. The weighted average in the report is
/// advisory; the submitted order is a market order for the full quantity.
#[instrument(skip(feed, gateway), fields(ticker = %ticker, leg = %leg))]
pub async fn execute_sweep(
    feed: &dyn MarketDataFeed,
    gateway: &dyn OrderGateway,
    ticker: &str,
    leg: Leg,
) -> Result<SweepReport, BotError> {
    let book = feed.orderbook(ticker).await?;
    let SweepQuote {
        quantity,
        average_price,
    } = price_sweep(ticker, leg, book.bids(leg.opposite()))?;

    info!(
        quantity,
        average_price,
        "Sweeping all resting liquidity"
    );

    let request = OrderRequest::market_buy(ticker, leg, quantity);
    let placed = gateway.place_order(&request).await?;
    metrics::inc_sweeps_executed();

    Ok(SweepReport {
        ticker: ticker.to_string(),
        leg,
        quantity,
        average_price,
        order_id: placed.order_id,
    })
}

/// Result of a bulk cancellation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelSummary {
    /// Orders successfully cancelled.
    pub cancelled: u32,
    /// Orders that failed to cancel, with reasons.
    pub failed: Vec<(String, String)>,
}

/// Cancel every resting order, best-effort.
///
/// Failures are collected rather than aborting the pass, so one stuck
/// order cannot strand the rest.
#[instrument(skip(feed, gateway))]
pub async fn cancel_all(
    feed: &dyn MarketDataFeed,
    gateway: &dyn OrderGateway,
) -> Result<CancelSummary, BotError> {
    let resting = feed.resting_orders().await?;
    let mut summary = CancelSummary::default();

    for order in resting {
        match gateway.cancel_order(&order.order_id).await {
            Ok(()) => summary.cancelled += 1,
            Err(e) => {
                warn!(order_id = %order.order_id, error = %e, "Cancel failed");
                summary.failed.push((order.order_id, e.to_string()));
            }
        }
    }

    metrics::inc_orders_cancelled(u64::from(summary.cancelled));
    info!(
        cancelled = summary.cancelled,
        failed = summary.failed.len(),
        "Bulk cancel finished"
    );

    Ok(summary)
}

impl CancelSummary {
    /// Whether every cancellation succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;
    use crate::market::mock::{BookBuilder, MockExchange};

    #[tokio::test]
    async fn sweep_buys_all_opposing_liquidity() {
        let exchange = MockExchange::new();
        exchange.set_book(
            "TEST",
            BookBuilder::new().no_bid(40, 10).no_bid(35, 5).build(),
        );

        let report = execute_sweep(&exchange, &exchange, "TEST", Leg::Yes)
            .await
            .unwrap();

        assert_eq!(report.quantity, 15);
        assert_eq!(report.average_price, 62);

        let placed = exchange.placed_orders();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0], OrderRequest::market_buy("TEST", Leg::Yes, 15));
    }

    #[tokio::test]
    async fn sweep_refuses_before_placing_when_no_liquidity() {
        let exchange = MockExchange::new();
        exchange.set_book("TEST", BookBuilder::new().yes_bid(85, 70).build());

        let result = execute_sweep(&exchange, &exchange, "TEST", Leg::Yes).await;

        assert!(matches!(
            result,
            Err(BotError::Quote(QuoteError::NoLiquidity { .. }))
        ));
        assert!(exchange.placed_orders().is_empty());
    }

    #[tokio::test]
    async fn cancel_all_reports_partial_failures() {
        let exchange = MockExchange::new();
        exchange.add_resting("TEST", Leg::Yes, 86, 10);
        exchange.add_resting("TEST", Leg::No, 12, 10);
        exchange.fail_cancels_matching("mock-2");

        let summary = cancel_all(&exchange, &exchange).await.unwrap();

        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(!summary.is_clean());
    }
}
