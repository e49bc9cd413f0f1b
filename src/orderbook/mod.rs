//! Order book module for market data.
//!
//! This module handles:
//! - Order book types and data structures
//! - Derived bid/ask/spread and running-total views
//! - Sweep ("max bet") pricing

pub mod sweep;
pub mod types;
pub mod view;

pub use sweep::{price_sweep, SweepQuote};
pub use types::{OrderBook, PriceLevel};
pub use view::{best_bid, best_bid_with_depth, BookView, DepthLevel, DerivedSide, SideView};
