//! Order book types and data structures.

use serde::{Deserialize, Serialize};

use crate::market::Leg;

/// Single resting-bid level: an integer-cent price and the contracts
/// resting there.
///
/// Wire-encoded as a `[price, quantity]` pair, matching the venue's
/// orderbook payload. The feed may repeat a price across entries; quantities
/// at the same price are additive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct PriceLevel {
    /// Price in cents, 1..=99.
    pub price: u32,
    /// Contracts resting at this price.
    pub quantity: u32,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: u32, quantity: u32) -> Self {
        Self { price, quantity }
    }
}

impl From<(u32, u32)> for PriceLevel {
    fn from((price, quantity): (u32, u32)) -> Self {
        Self { price, quantity }
    }
}

impl From<PriceLevel> for (u32, u32) {
    fn from(level: PriceLevel) -> Self {
        (level.price, level.quantity)
    }
}

/// The resting-bid book of a binary market: one sequence of bid levels per
/// leg. There is no independent ask book — asks are derived from the
/// opposing leg's bids.
///
/// The feed makes no ordering promise on either sequence, so consumers must
/// compute extrema explicitly rather than index into the ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBook {
    /// Resting bids on the "yes" leg.
    #[serde(default)]
    pub yes: Vec<PriceLevel>,
    /// Resting bids on the "no" leg.
    #[serde(default)]
    pub no: Vec<PriceLevel>,
}

impl OrderBook {
    /// Create a book from raw bid sequences.
    pub fn new(yes: Vec<PriceLevel>, no: Vec<PriceLevel>) -> Self {
        Self { yes, no }
    }

    /// Resting bids for a leg.
    pub fn bids(&self, leg: Leg) -> &[PriceLevel] {
        match leg {
            Leg::Yes => &self.yes,
            Leg::No => &self.no,
        }
    }

    /// Whether both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.yes.is_empty() && self.no.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_level_creation() {
        let level = PriceLevel::new(85, 120);
        assert_eq!(level.price, 85);
        assert_eq!(level.quantity, 120);
    }

    #[test]
    fn price_level_wire_format_is_a_pair() {
        let level: PriceLevel = serde_json::from_str("[85, 120]").unwrap();
        assert_eq!(level, PriceLevel::new(85, 120));
        assert_eq!(serde_json::to_string(&level).unwrap(), "[85,120]");
    }

    #[test]
    fn orderbook_tolerates_missing_sides() {
        let book: OrderBook = serde_json::from_str(r#"{"yes": [[40, 10]]}"#).unwrap();
        assert_eq!(book.yes, vec![PriceLevel::new(40, 10)]);
        assert!(book.no.is_empty());
        assert!(!book.is_empty());
    }

    #[test]
    fn bids_selects_the_right_side() {
        let book = OrderBook::new(
            vec![PriceLevel::new(85, 70)],
            vec![PriceLevel::new(10, 30)],
        );
        assert_eq!(book.bids(Leg::Yes), &[PriceLevel::new(85, 70)]);
        assert_eq!(book.bids(Leg::No), &[PriceLevel::new(10, 30)]);
    }
}
