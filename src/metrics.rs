//! Prometheus metrics for the quoting loop.
//!
//! This module provides metrics for:
//! - Quote placement and veto counts
//! - Tick evaluation latency
//! - Order book fetch latency
//! - Sweep executions and bulk cancels

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Quotes placed counter metric name.
pub const METRIC_QUOTES_PLACED: &str = "quotes_placed_total";
/// Quote vetoes counter metric name (labelled by reason).
pub const METRIC_QUOTE_VETOES: &str = "quote_vetoes_total";
/// Quote placement failures counter metric name.
pub const METRIC_QUOTE_FAILURES: &str = "quote_failures_total";
/// Sweeps executed counter metric name.
pub const METRIC_SWEEPS_EXECUTED: &str = "sweeps_executed_total";
/// Orders cancelled counter metric name.
pub const METRIC_ORDERS_CANCELLED: &str = "orders_cancelled_total";
/// Tick evaluation latency metric name.
pub const METRIC_TICK_LATENCY: &str = "tick_latency_ms";
/// Order book fetch latency metric name.
pub const METRIC_BOOK_FETCH_LATENCY: &str = "book_fetch_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(METRIC_TICK_LATENCY, "Full tick evaluation latency in milliseconds");
    describe_histogram!(
        METRIC_BOOK_FETCH_LATENCY,
        "Order book fetch latency in milliseconds"
    );

    describe_counter!(METRIC_QUOTES_PLACED, "Total number of quotes placed");
    describe_counter!(
        METRIC_QUOTE_VETOES,
        "Total number of quote evaluations vetoed, by reason"
    );
    describe_counter!(
        METRIC_QUOTE_FAILURES,
        "Total number of quote placements that failed"
    );
    describe_counter!(METRIC_SWEEPS_EXECUTED, "Total number of sweeps executed");
    describe_counter!(METRIC_ORDERS_CANCELLED, "Total number of orders cancelled");

    debug!("Metrics initialized");
}

/// Increment quotes placed counter.
pub fn inc_quotes_placed() {
    counter!(METRIC_QUOTES_PLACED).increment(1);
}

/// Increment quote vetoes counter for a reason.
pub fn inc_quote_vetoes(reason: &'static str) {
    counter!(METRIC_QUOTE_VETOES, "reason" => reason).increment(1);
}

/// Increment quote failures counter.
pub fn inc_quote_failures() {
    counter!(METRIC_QUOTE_FAILURES).increment(1);
}

/// Increment sweeps executed counter.
pub fn inc_sweeps_executed() {
    counter!(METRIC_SWEEPS_EXECUTED).increment(1);
}

/// Increment orders cancelled counter.
pub fn inc_orders_cancelled(count: u64) {
    counter!(METRIC_ORDERS_CANCELLED).increment(count);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a full tick evaluation.
pub fn timer_tick() -> LatencyTimer {
    LatencyTimer::new(METRIC_TICK_LATENCY)
}

/// Create a latency timer for an order book fetch.
pub fn timer_book_fetch() -> LatencyTimer {
    LatencyTimer::new(METRIC_BOOK_FETCH_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 9.0); // Allow some tolerance
        // Timer will record on drop
    }
}
