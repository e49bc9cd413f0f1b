//! End-to-end tests for the quoting loop against the in-memory exchange.
//!
//! These exercise the full path: snapshot assembly, the engine's guard
//! chain, and order placement through the gateway trait.

use std::sync::Arc;

use kalshi_quoter::market::mock::{BookBuilder, MockExchange};
use kalshi_quoter::market::{Leg, MarketDataFeed, QuoteMode};
use kalshi_quoter::quoting::{QuoteEngine, QuotePolicy, QuoteRunner};
use kalshi_quoter::trading::{cancel_all, execute_sweep, OrderRequest};

fn live_runner(exchange: Arc<MockExchange>, modes: &[(&str, QuoteMode)]) -> QuoteRunner {
    let engine = QuoteEngine::new(
        QuotePolicy::default(),
        modes.iter().map(|(t, m)| (t.to_string(), *m)),
    );
    QuoteRunner::new(engine, exchange.clone(), exchange, false)
}

#[tokio::test]
async fn quote_lands_one_cent_in_front() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "INXD-26AUG",
        BookBuilder::new().yes_bid(85, 70).no_bid(10, 30).build(),
    );

    let mut runner = live_runner(exchange.clone(), &[("INXD-26AUG", QuoteMode::Yes)]);
    runner.tick_once().await;

    let placed = exchange.placed_orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(
        placed[0],
        OrderRequest::limit_buy("INXD-26AUG", Leg::Yes, 86, 10)
    );
}

#[tokio::test]
async fn placed_quote_suppresses_the_next_tick_twice_over() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "T",
        BookBuilder::new().yes_bid(85, 70).no_bid(10, 30).build(),
    );

    let mut runner = live_runner(exchange.clone(), &[("T", QuoteMode::Yes)]);
    runner.tick_once().await;
    assert_eq!(exchange.placed_orders().len(), 1);

    // Second tick: the key is pending, and even once the grace window
    // lapses the order now rests on the mock book, so nothing more goes out.
    runner.tick_once().await;
    runner.tick_once().await;
    assert_eq!(exchange.placed_orders().len(), 1);
}

#[tokio::test]
async fn pre_existing_order_blocks_its_key_only() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "T",
        BookBuilder::new().yes_bid(60, 80).no_bid(30, 90).build(),
    );
    exchange.add_resting("T", Leg::Yes, 61, 10);

    let mut runner = live_runner(exchange.clone(), &[("T", QuoteMode::Both)]);
    runner.tick_once().await;

    let placed = exchange.placed_orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].leg, Leg::No);
    assert_eq!(placed[0].price, Some(31));
}

#[tokio::test]
async fn over_limit_position_silences_the_long_leg() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "T",
        BookBuilder::new().yes_bid(85, 70).no_bid(10, 30).build(),
    );
    exchange.set_position("T", 55);

    let mut runner = live_runner(exchange.clone(), &[("T", QuoteMode::Yes)]);
    runner.tick_once().await;

    assert!(exchange.placed_orders().is_empty());
}

#[tokio::test]
async fn tight_spread_never_self_crosses() {
    let exchange = Arc::new(MockExchange::new());
    // yes bid 85, no bid 14: derived yes ask is 86, so a penny in front
    // would trade instead of rest.
    exchange.set_book(
        "T",
        BookBuilder::new().yes_bid(85, 70).no_bid(14, 80).build(),
    );

    let mut runner = live_runner(exchange.clone(), &[("T", QuoteMode::Both)]);
    runner.tick_once().await;

    assert!(exchange.placed_orders().is_empty());
}

#[tokio::test]
async fn sweep_then_cancel_all_round_trip() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "T",
        BookBuilder::new().no_bid(40, 10).no_bid(35, 5).build(),
    );

    let report = execute_sweep(exchange.as_ref(), exchange.as_ref(), "T", Leg::Yes)
        .await
        .unwrap();
    assert_eq!(report.quantity, 15);
    assert_eq!(report.average_price, 62);

    // The sweep was a market order, so nothing rests to cancel.
    let summary = cancel_all(exchange.as_ref(), exchange.as_ref())
        .await
        .unwrap();
    assert_eq!(summary.cancelled, 0);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn cancel_all_pulls_every_resting_quote() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "A",
        BookBuilder::new().yes_bid(60, 80).no_bid(30, 90).build(),
    );
    exchange.set_book(
        "B",
        BookBuilder::new().yes_bid(45, 100).no_bid(50, 100).build(),
    );

    let mut runner = live_runner(
        exchange.clone(),
        &[("A", QuoteMode::Both), ("B", QuoteMode::Yes)],
    );
    runner.tick_once().await;
    assert_eq!(exchange.placed_orders().len(), 3);

    let summary = cancel_all(exchange.as_ref(), exchange.as_ref())
        .await
        .unwrap();
    assert_eq!(summary.cancelled, 3);
    assert!(exchange.resting_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn dry_run_places_nothing_anywhere() {
    let exchange = Arc::new(MockExchange::new());
    exchange.set_book(
        "T",
        BookBuilder::new().yes_bid(85, 70).no_bid(10, 30).build(),
    );

    let engine = QuoteEngine::new(
        QuotePolicy::default(),
        [("T".to_string(), QuoteMode::Both)],
    );
    let mut runner = QuoteRunner::new(engine, exchange.clone(), exchange.clone(), true);

    runner.tick_once().await;
    assert!(exchange.placed_orders().is_empty());
    assert!(exchange.resting_orders().await.unwrap().is_empty());
    // The engine still evaluated and emitted.
    assert!(runner.engine().stats().quotes_emitted >= 1);
}
