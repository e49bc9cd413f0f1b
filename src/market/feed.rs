//! Collaborator contracts for market data and order flow.
//!
//! The engine only ever sees these two traits. HTTP/JSON framing, retries,
//! and venue quirks live behind them in the concrete client; tests swap in
//! the in-memory mock.

use async_trait::async_trait;

use crate::error::{MarketError, TradingError};
use crate::orderbook::OrderBook;
use crate::trading::{OrderRequest, PlacedOrder, PositionBook, RestingOrder};

/// Read-side contract: live orderbooks, positions, and resting orders.
///
/// All reads are best-effort snapshots; freshness is whatever the venue
/// returns, and the three reads are not atomic with one another.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Fetch the resting-bid book for a market. Either side may be empty.
    async fn orderbook(&self, ticker: &str) -> Result<OrderBook, MarketError>;

    /// Fetch signed positions across all markets.
    async fn positions(&self) -> Result<PositionBook, MarketError>;

    /// Fetch all currently resting orders.
    async fn resting_orders(&self) -> Result<Vec<RestingOrder>, MarketError>;
}

/// Write-side contract: order placement and cancellation.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order; returns the venue-assigned ID on acceptance.
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, TradingError>;

    /// Cancel a resting order by ID.
    async fn cancel_order(&self, order_id: &str) -> Result<(), TradingError>;
}
