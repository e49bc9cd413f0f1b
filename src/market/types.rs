//! Market-level types for binary prediction markets.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the two complementary legs of a binary market.
///
/// Leg prices always sum to 100 cents at the point of a crossing trade, so
/// the ask side of one leg is the opposing leg's bids through `100 - price`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Leg {
    /// The "yes" outcome.
    #[default]
    Yes,
    /// The "no" outcome.
    No,
}

impl Leg {
    /// Get the opposing leg.
    pub fn opposite(&self) -> Self {
        match self {
            Leg::Yes => Leg::No,
            Leg::No => Leg::Yes,
        }
    }
}

/// Per-ticker automation mode for the quoting engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteMode {
    /// Quoting disabled.
    #[default]
    Off,
    /// Quote the "yes" leg only.
    Yes,
    /// Quote the "no" leg only.
    No,
    /// Quote both legs independently.
    Both,
}

impl QuoteMode {
    /// The legs this mode evaluates each tick.
    pub fn legs(&self) -> &'static [Leg] {
        match self {
            QuoteMode::Off => &[],
            QuoteMode::Yes => &[Leg::Yes],
            QuoteMode::No => &[Leg::No],
            QuoteMode::Both => &[Leg::Yes, Leg::No],
        }
    }

    /// Whether this mode evaluates anything at all.
    pub fn is_active(&self) -> bool {
        !matches!(self, QuoteMode::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn leg_opposite_is_involutive() {
        assert_eq!(Leg::Yes.opposite(), Leg::No);
        assert_eq!(Leg::No.opposite(), Leg::Yes);
        assert_eq!(Leg::Yes.opposite().opposite(), Leg::Yes);
    }

    #[test]
    fn leg_parses_from_string() {
        assert_eq!(Leg::from_str("yes").unwrap(), Leg::Yes);
        assert_eq!(Leg::from_str("no").unwrap(), Leg::No);
        assert!(Leg::from_str("maybe").is_err());
    }

    #[test]
    fn mode_legs_enumerate_correctly() {
        assert!(QuoteMode::Off.legs().is_empty());
        assert_eq!(QuoteMode::Yes.legs(), &[Leg::Yes]);
        assert_eq!(QuoteMode::No.legs(), &[Leg::No]);
        assert_eq!(QuoteMode::Both.legs(), &[Leg::Yes, Leg::No]);
        assert!(!QuoteMode::Off.is_active());
        assert!(QuoteMode::Both.is_active());
    }
}
