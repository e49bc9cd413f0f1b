//! Automated penny-quoting bot for binary prediction markets.
//!
//! The bot watches the resting-bid book of a Kalshi-style binary market and
//! rests a passive limit bid one cent inside the current best bid whenever a
//! set of admission guards pass — the classic penny-in-front-of-the-book
//! tactic, applied independently to the "yes" and "no" legs.
//!
//! # Market model
//!
//! A binary market has two complementary legs whose prices always sum to
//! 100 cents at a crossing trade. The venue keeps a single book of resting
//! bids per leg; the ask side of one leg is just the opposing leg's bids
//! seen through `100 - price`:
//!
//! ```text
//! YES best bid:  85¢
//! NO  best bid:  10¢  →  YES best ask: 90¢
//! ─────────────────────
//! YES spread:     5¢
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Feed/gateway contracts, venue client, and mock exchange
//! - [`orderbook`]: Derived book views and sweep pricing
//! - [`quoting`]: The quoting decision engine and tick scheduler
//! - [`trading`]: Order types, positions, and sweep execution
//! - [`api`]: HTTP API for health/metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod orderbook;
pub mod quoting;
pub mod trading;
pub mod utils;

pub use config::Config;
pub use error::{BotError, Result};
