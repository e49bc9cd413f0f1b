//! Position tracking.

use std::collections::HashMap;

use crate::market::Leg;

/// Signed per-ticker positions.
///
/// Binary-market convention: positive = long "yes", negative = long "no"
/// (a short "yes" is economically a long "no"). Zero means flat, and an
/// absent ticker reads as flat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionBook {
    contracts: HashMap<String, i64>,
}

impl PositionBook {
    /// Empty position book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed contracts held in a market; zero when absent.
    pub fn contracts(&self, ticker: &str) -> i64 {
        self.contracts.get(ticker).copied().unwrap_or(0)
    }

    /// Record the position for a ticker.
    pub fn set(&mut self, ticker: impl Into<String>, contracts: i64) {
        self.contracts.insert(ticker.into(), contracts);
    }

    /// Exposure on a leg: how many contracts effectively held long on it.
    pub fn exposure(&self, ticker: &str, leg: Leg) -> i64 {
        let position = self.contracts(ticker);
        match leg {
            Leg::Yes => position,
            Leg::No => -position,
        }
    }

    /// Whether adding long exposure on `leg` is blocked by the limit.
    pub fn breaches_limit(&self, ticker: &str, leg: Leg, limit: i64) -> bool {
        self.exposure(ticker, leg) > limit
    }

    /// Number of tickers with a recorded position.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether no positions are recorded.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Iterate over (ticker, contracts) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.contracts.iter().map(|(t, &c)| (t.as_str(), c))
    }
}

impl FromIterator<(String, i64)> for PositionBook {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            contracts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_ticker_is_flat() {
        let book = PositionBook::new();
        assert_eq!(book.contracts("INXD-26AUG"), 0);
        assert!(!book.breaches_limit("INXD-26AUG", Leg::Yes, 50));
    }

    #[test]
    fn exposure_follows_sign_convention() {
        let mut book = PositionBook::new();
        book.set("LONG-YES", 55);
        book.set("LONG-NO", -55);

        assert_eq!(book.exposure("LONG-YES", Leg::Yes), 55);
        assert_eq!(book.exposure("LONG-YES", Leg::No), -55);
        assert_eq!(book.exposure("LONG-NO", Leg::No), 55);
    }

    #[test]
    fn limit_breach_is_per_leg() {
        let mut book = PositionBook::new();
        book.set("T", 55);

        assert!(book.breaches_limit("T", Leg::Yes, 50));
        // Long yes leaves plenty of room to accumulate no.
        assert!(!book.breaches_limit("T", Leg::No, 50));

        book.set("T", -55);
        assert!(book.breaches_limit("T", Leg::No, 50));
        assert!(!book.breaches_limit("T", Leg::Yes, 50));
    }

    #[test]
    fn exactly_at_limit_is_allowed() {
        let mut book = PositionBook::new();
        book.set("T", 50);
        assert!(!book.breaches_limit("T", Leg::Yes, 50));
    }
}
