//! Sweep ("max bet") pricing.
//!
//! A sweep buys every contract resting on the ask side of a leg in one
//! market order. The ask side is the opposing leg's bids through
//! `100 - price`, so the pricer takes opposing bids and reports the total
//! fillable quantity plus a liquidity-weighted average ask price.
//!
//! The average is advisory — the submitted order is a market order for the
//! total quantity and carries no price — but the caller must still refuse
//! the sweep entirely when the opposing side is empty.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::instrument;

use super::types::PriceLevel;
use crate::error::QuoteError;
use crate::market::Leg;

/// Advisory pricing for a sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepQuote {
    /// Total contracts fillable across all opposing levels.
    pub quantity: u32,
    /// Liquidity-weighted average ask price, rounded half-up to the
    /// nearest cent.
    pub average_price: u32,
}

/// Price a sweep of a leg from the opposing leg's resting bids.
///
/// Zero opposing liquidity is a refusal, never a zero price.
#[instrument(skip(opposing_bids), fields(ticker = %ticker, leg = %leg))]
pub fn price_sweep(
    ticker: &str,
    leg: Leg,
    opposing_bids: &[PriceLevel],
) -> Result<SweepQuote, QuoteError> {
    let quantity: u64 = opposing_bids.iter().map(|l| u64::from(l.quantity)).sum();

    if quantity == 0 {
        return Err(QuoteError::NoLiquidity {
            ticker: ticker.to_string(),
            leg,
        });
    }

    let cost: u64 = opposing_bids
        .iter()
        .map(|l| u64::from(100 - l.price) * u64::from(l.quantity))
        .sum();

    let average = (Decimal::from(cost) / Decimal::from(quantity))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let average_price = average
        .to_u32()
        .ok_or(QuoteError::InvalidPrice(u32::MAX))?;

    Ok(SweepQuote {
        quantity: quantity as u32,
        average_price,
    })
}
