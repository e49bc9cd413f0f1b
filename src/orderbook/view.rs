//! Derived per-leg views over the resting-bid book.
//!
//! The venue stores only bids. Everything the quoting logic and the display
//! layers need — best bid, derived ask, spread, running-total ladders — is
//! computed here without mutating the input book. An empty side yields
//! `None` for every affected value; `None` and zero are distinct outcomes
//! and must stay that way.

use serde::Serialize;

use super::types::{OrderBook, PriceLevel};
use crate::market::Leg;

/// Best bid price for a side: the maximum price carrying quantity.
///
/// The feed does not promise sorted levels, so this scans rather than
/// indexing the first element.
pub fn best_bid(levels: &[PriceLevel]) -> Option<u32> {
    levels
        .iter()
        .filter(|l| l.quantity > 0)
        .map(|l| l.price)
        .max()
}

/// Total quantity resting at a given price, summing duplicate entries.
pub fn depth_at(levels: &[PriceLevel], price: u32) -> u32 {
    levels
        .iter()
        .filter(|l| l.price == price)
        .map(|l| l.quantity)
        .sum()
}

/// Best bid price and the total quantity resting there.
pub fn best_bid_with_depth(levels: &[PriceLevel]) -> Option<(u32, u32)> {
    let price = best_bid(levels)?;
    Some((price, depth_at(levels, price)))
}

/// One row of a running-total ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    /// Price in cents.
    pub price: u32,
    /// Quantity resting at exactly this price (duplicates merged).
    pub quantity: u32,
    /// Cumulative quantity from the best price down to this row.
    pub cumulative: u32,
}

/// Best bid, derived ask, and spread for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DerivedSide {
    /// Best bid on this leg, if any quantity rests.
    pub best_bid: Option<u32>,
    /// Best ask, `100 - opposing best bid`, if the opposing side has levels.
    pub best_ask: Option<u32>,
    /// `best_ask - best_bid` when both are defined.
    pub spread: Option<u32>,
}

/// Full derived view of one leg: top-of-book plus both ladders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideView {
    /// Top-of-book summary.
    pub derived: DerivedSide,
    /// Bid ladder, best price first, with running totals.
    pub bids: Vec<DepthLevel>,
    /// Ask ladder derived from the opposing leg, best (lowest) ask first.
    pub asks: Vec<DepthLevel>,
}

/// Derived views for both legs of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookView {
    /// The "yes" leg view.
    pub yes: SideView,
    /// The "no" leg view.
    pub no: SideView,
}

impl BookView {
    /// Build the derived view for both legs of a book.
    pub fn from_book(book: &OrderBook) -> Self {
        Self {
            yes: side_view(book, Leg::Yes),
            no: side_view(book, Leg::No),
        }
    }

    /// The view for a leg.
    pub fn side(&self, leg: Leg) -> &SideView {
        match leg {
            Leg::Yes => &self.yes,
            Leg::No => &self.no,
        }
    }
}

/// Top-of-book summary for one leg of a book.
pub fn derived_side(book: &OrderBook, leg: Leg) -> DerivedSide {
    let bid = best_bid(book.bids(leg));
    let ask = best_bid(book.bids(leg.opposite())).map(|p| 100 - p);
    let spread = match (bid, ask) {
        (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
        _ => None,
    };
    DerivedSide {
        best_bid: bid,
        best_ask: ask,
        spread,
    }
}

fn side_view(book: &OrderBook, leg: Leg) -> SideView {
    SideView {
        derived: derived_side(book, leg),
        bids: bid_ladder(book.bids(leg)),
        asks: ask_ladder(book.bids(leg.opposite())),
    }
}

/// Bid ladder: duplicate prices merged, sorted best (highest) price first,
/// with cumulative quantity accumulated from the top.
pub fn bid_ladder(levels: &[PriceLevel]) -> Vec<DepthLevel> {
    let mut merged = coalesce(levels);
    merged.sort_by(|a, b| b.price.cmp(&a.price));
    with_running_totals(merged)
}

/// Ask ladder for a leg, derived from the opposing leg's bids via
/// `100 - price`. Best (lowest) ask first, cumulative from the top.
pub fn ask_ladder(opposing_bids: &[PriceLevel]) -> Vec<DepthLevel> {
    let mut merged = coalesce(opposing_bids);
    for level in &mut merged {
        level.price = 100 - level.price;
    }
    merged.sort_by(|a, b| a.price.cmp(&b.price));
    with_running_totals(merged)
}

fn coalesce(levels: &[PriceLevel]) -> Vec<PriceLevel> {
    use std::collections::BTreeMap;

    let mut by_price: BTreeMap<u32, u32> = BTreeMap::new();
    for level in levels.iter().filter(|l| l.quantity > 0) {
        *by_price.entry(level.price).or_default() += level.quantity;
    }
    by_price
        .into_iter()
        .map(|(price, quantity)| PriceLevel { price, quantity })
        .collect()
}

fn with_running_totals(levels: Vec<PriceLevel>) -> Vec<DepthLevel> {
    let mut cumulative = 0u32;
    levels
        .into_iter()
        .map(|l| {
            cumulative += l.quantity;
            DepthLevel {
                price: l.price,
                quantity: l.quantity,
                cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn levels(pairs: &[(u32, u32)]) -> Vec<PriceLevel> {
        pairs.iter().map(|&(p, q)| PriceLevel::new(p, q)).collect()
    }

    #[test]
    fn best_bid_ignores_sort_order() {
        let bids = levels(&[(40, 10), (85, 70), (60, 5)]);
        assert_eq!(best_bid(&bids), Some(85));
    }

    #[test]
    fn best_bid_skips_empty_levels() {
        let bids = levels(&[(90, 0), (85, 70)]);
        assert_eq!(best_bid(&bids), Some(85));
        assert_eq!(best_bid(&[]), None);
    }

    #[test]
    fn depth_sums_duplicate_prices() {
        let bids = levels(&[(85, 40), (80, 10), (85, 30)]);
        assert_eq!(depth_at(&bids, 85), 70);
        assert_eq!(best_bid_with_depth(&bids), Some((85, 70)));
    }

    #[test]
    fn ask_is_complement_of_opposing_bid() {
        let book = OrderBook::new(levels(&[(85, 70)]), levels(&[(10, 30)]));

        let yes = derived_side(&book, Leg::Yes);
        assert_eq!(yes.best_bid, Some(85));
        assert_eq!(yes.best_ask, Some(90));
        assert_eq!(yes.spread, Some(5));

        let no = derived_side(&book, Leg::No);
        assert_eq!(no.best_bid, Some(10));
        assert_eq!(no.best_ask, Some(15));
        assert_eq!(no.spread, Some(5));
    }

    #[test]
    fn empty_opposing_side_leaves_ask_undefined() {
        let book = OrderBook::new(levels(&[(85, 70)]), Vec::new());

        let yes = derived_side(&book, Leg::Yes);
        assert_eq!(yes.best_bid, Some(85));
        assert_eq!(yes.best_ask, None);
        assert_eq!(yes.spread, None);

        let no = derived_side(&book, Leg::No);
        assert_eq!(no.best_bid, None);
        assert_eq!(no.best_ask, Some(15));
        assert_eq!(no.spread, None);
    }

    #[test]
    fn empty_book_is_all_undefined() {
        let view = BookView::from_book(&OrderBook::default());
        assert_eq!(view.yes.derived, DerivedSide::default());
        assert_eq!(view.no.derived, DerivedSide::default());
        assert!(view.yes.bids.is_empty());
        assert!(view.no.asks.is_empty());
    }

    #[test]
    fn bid_ladder_sorts_and_accumulates() {
        let ladder = bid_ladder(&levels(&[(40, 10), (85, 40), (85, 30), (60, 5)]));

        assert_eq!(
            ladder,
            vec![
                DepthLevel { price: 85, quantity: 70, cumulative: 70 },
                DepthLevel { price: 60, quantity: 5, cumulative: 75 },
                DepthLevel { price: 40, quantity: 10, cumulative: 85 },
            ]
        );
    }

    #[test]
    fn ask_ladder_converts_and_sorts_ascending() {
        // NO bids at 10 and 25 become YES asks at 90 and 75.
        let ladder = ask_ladder(&levels(&[(10, 30), (25, 20)]));

        assert_eq!(
            ladder,
            vec![
                DepthLevel { price: 75, quantity: 20, cumulative: 20 },
                DepthLevel { price: 90, quantity: 30, cumulative: 50 },
            ]
        );
    }

    #[test]
    fn running_totals_are_non_decreasing_and_complete() {
        let bids = levels(&[(40, 10), (85, 40), (85, 30), (60, 5), (12, 0)]);
        let ladder = bid_ladder(&bids);

        let mut prev = 0;
        for row in &ladder {
            assert!(row.cumulative >= prev);
            prev = row.cumulative;
        }
        let total: u32 = bids.iter().map(|l| l.quantity).sum();
        assert_eq!(ladder.last().unwrap().cumulative, total);
    }

    #[test]
    fn view_does_not_mutate_the_book() {
        let book = OrderBook::new(levels(&[(40, 10), (85, 70)]), levels(&[(10, 30)]));
        let before = book.clone();
        let _ = BookView::from_book(&book);
        assert_eq!(book, before);
    }
}
