//! In-memory mock exchange for testing.
//!
//! Implements both collaborator traits over interior-mutable state so a
//! single instance can serve as feed and gateway in tests. Supports
//! failure injection per read path and selective cancel failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{MarketError, TradingError};
use crate::market::feed::{MarketDataFeed, OrderGateway};
use crate::market::Leg;
use crate::orderbook::{OrderBook, PriceLevel};
use crate::trading::{Action, OrderRequest, PlacedOrder, PositionBook, RestingOrder};

/// Mock exchange holding books, positions, and resting orders in memory.
#[derive(Debug, Default)]
pub struct MockExchange {
    books: Mutex<HashMap<String, OrderBook>>,
    positions: Mutex<PositionBook>,
    resting: Mutex<Vec<RestingOrder>>,
    placed: Mutex<Vec<OrderRequest>>,
    next_id: AtomicU64,
    fail_orderbook: AtomicBool,
    fail_positions: AtomicBool,
    fail_resting: AtomicBool,
    fail_place: AtomicBool,
    fail_cancel_ids: Mutex<Vec<String>>,
}

impl MockExchange {
    /// Create an empty mock exchange.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the orderbook for a ticker.
    pub fn set_book(&self, ticker: impl Into<String>, book: OrderBook) {
        self.books.lock().unwrap().insert(ticker.into(), book);
    }

    /// Set the signed position for a ticker.
    pub fn set_position(&self, ticker: impl Into<String>, contracts: i64) {
        self.positions.lock().unwrap().set(ticker, contracts);
    }

    /// Add a resting buy order, assigning the next mock ID.
    ///
    /// Returns the assigned ID ("mock-1", "mock-2", ...).
    pub fn add_resting(&self, ticker: impl Into<String>, leg: Leg, price: u32, quantity: u32) -> String {
        let order_id = self.allocate_id();
        self.resting.lock().unwrap().push(RestingOrder {
            order_id: order_id.clone(),
            ticker: ticker.into(),
            leg,
            action: Action::Buy,
            price,
            remaining_quantity: quantity,
            created_time: None,
        });
        order_id
    }

    /// Every order placed through the gateway, in submission order.
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }

    /// Make orderbook fetches fail.
    pub fn fail_orderbook(&self) {
        self.fail_orderbook.store(true, Ordering::SeqCst);
    }

    /// Make position fetches fail.
    pub fn fail_positions(&self) {
        self.fail_positions.store(true, Ordering::SeqCst);
    }

    /// Make resting-order fetches fail.
    pub fn fail_resting_orders(&self) {
        self.fail_resting.store(true, Ordering::SeqCst);
    }

    /// Make order placement fail.
    pub fn fail_placement(&self) {
        self.fail_place.store(true, Ordering::SeqCst);
    }

    /// Make cancellation fail for a specific order ID.
    pub fn fail_cancels_matching(&self, order_id: impl Into<String>) {
        self.fail_cancel_ids.lock().unwrap().push(order_id.into());
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("mock-{n}")
    }
}

#[async_trait]
impl MarketDataFeed for MockExchange {
    async fn orderbook(&self, ticker: &str) -> Result<OrderBook, MarketError> {
        if self.fail_orderbook.load(Ordering::SeqCst) {
            return Err(MarketError::FetchFailed {
                what: "orderbook",
                ticker: ticker.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self
            .books
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .unwrap_or_default())
    }

    async fn positions(&self) -> Result<PositionBook, MarketError> {
        if self.fail_positions.load(Ordering::SeqCst) {
            return Err(MarketError::FetchFailed {
                what: "positions",
                ticker: "-".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.positions.lock().unwrap().clone())
    }

    async fn resting_orders(&self) -> Result<Vec<RestingOrder>, MarketError> {
        if self.fail_resting.load(Ordering::SeqCst) {
            return Err(MarketError::FetchFailed {
                what: "orders",
                ticker: "-".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.resting.lock().unwrap().clone())
    }
}

#[async_trait]
impl OrderGateway for MockExchange {
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, TradingError> {
        request.validate().map_err(TradingError::InvalidParams)?;

        if self.fail_place.load(Ordering::SeqCst) {
            return Err(TradingError::SubmissionFailed(
                "injected failure".to_string(),
            ));
        }

        self.placed.lock().unwrap().push(request.clone());
        let order_id = self.allocate_id();

        // Limit orders rest on the mock book like the real venue's would.
        if let Some(price) = request.price {
            self.resting.lock().unwrap().push(RestingOrder {
                order_id: order_id.clone(),
                ticker: request.ticker.clone(),
                leg: request.leg,
                action: request.action,
                price,
                remaining_quantity: request.quantity,
                created_time: None,
            });
        }

        Ok(PlacedOrder { order_id })
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), TradingError> {
        if self
            .fail_cancel_ids
            .lock()
            .unwrap()
            .iter()
            .any(|id| id == order_id)
        {
            return Err(TradingError::CancelFailed {
                order_id: order_id.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let mut resting = self.resting.lock().unwrap();
        let before = resting.len();
        resting.retain(|o| o.order_id != order_id);
        if resting.len() == before {
            return Err(TradingError::CancelFailed {
                order_id: order_id.to_string(),
                reason: "no such order".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for orderbooks in tests.
#[derive(Debug, Default)]
pub struct BookBuilder {
    yes: Vec<PriceLevel>,
    no: Vec<PriceLevel>,
}

impl BookBuilder {
    /// Start an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resting bid on the "yes" leg.
    pub fn yes_bid(mut self, price: u32, quantity: u32) -> Self {
        self.yes.push(PriceLevel::new(price, quantity));
        self
    }

    /// Add a resting bid on the "no" leg.
    pub fn no_bid(mut self, price: u32, quantity: u32) -> Self {
        self.no.push(PriceLevel::new(price, quantity));
        self
    }

    /// Finish the book.
    pub fn build(self) -> OrderBook {
        OrderBook::new(self.yes, self.no)
    }
}
