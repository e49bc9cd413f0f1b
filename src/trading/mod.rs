//! Trading module for order management and execution.
//!
//! This module handles:
//! - Order types and creation
//! - Position tracking
//! - Sweep execution and bulk cancellation

pub mod execution;
pub mod order;
pub mod position;

pub use execution::{cancel_all, execute_sweep, CancelSummary, SweepReport};
pub use order::{Action, OrderKind, OrderRequest, PlacedOrder, RestingOrder};
pub use position::PositionBook;
