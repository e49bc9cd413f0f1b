//! Market data access and venue integration.
//!
//! This module handles:
//! - Core market types (legs, quoting modes)
//! - Collaborator traits the engine consumes
//! - The venue REST client
//! - An in-memory mock exchange for tests

pub mod client;
pub mod feed;
pub mod mock;
pub mod types;

pub use client::{Balance, KalshiClient};
pub use feed::{MarketDataFeed, OrderGateway};
pub use types::{Leg, QuoteMode};
