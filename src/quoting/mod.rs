//! Penny-quoting decision engine and tick loop.
//!
//! This module handles:
//! - The per-(ticker, leg) decision engine and its guard chain
//! - The tick runner that feeds it snapshots and places its intents

pub mod engine;
pub mod runner;

pub use engine::{
    Decision, EngineStats, QuoteEngine, QuoteIntent, QuoteKey, QuotePolicy, TickSnapshot, Veto,
};
pub use runner::QuoteRunner;
