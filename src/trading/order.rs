//! Order types and creation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::market::Leg;

/// Order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// Buy contracts on a leg.
    Buy,
    /// Sell contracts on a leg.
    Sell,
}

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderKind {
    /// Passive limit order resting at a price.
    Limit,
    /// Market order consuming resting liquidity; carries no price.
    Market,
}

/// Parameters for an order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Market ticker.
    pub ticker: String,
    /// Which leg to trade.
    pub leg: Leg,
    /// Buy or sell.
    pub action: Action,
    /// Contracts to trade.
    pub quantity: u32,
    /// Limit or market.
    pub kind: OrderKind,
    /// Limit price in cents; `None` for market orders.
    pub price: Option<u32>,
}

impl OrderRequest {
    /// Create a limit buy resting at `price`.
    pub fn limit_buy(ticker: impl Into<String>, leg: Leg, price: u32, quantity: u32) -> Self {
        Self {
            ticker: ticker.into(),
            leg,
            action: Action::Buy,
            quantity,
            kind: OrderKind::Limit,
            price: Some(price),
        }
    }

    /// Create a market buy for `quantity` contracts.
    pub fn market_buy(ticker: impl Into<String>, leg: Leg, quantity: u32) -> Self {
        Self {
            ticker: ticker.into(),
            leg,
            action: Action::Buy,
            quantity,
            kind: OrderKind::Market,
            price: None,
        }
    }

    /// Validate order parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.ticker.is_empty() {
            return Err("ticker is required".to_string());
        }
        if self.quantity == 0 {
            return Err("quantity must be positive".to_string());
        }
        match (self.kind, self.price) {
            (OrderKind::Limit, None) => Err("limit orders require a price".to_string()),
            (OrderKind::Limit, Some(p)) if !(1..=99).contains(&p) => {
                Err(format!("limit price {p} outside valid range 1..=99"))
            }
            (OrderKind::Market, Some(_)) => Err("market orders carry no price".to_string()),
            _ => Ok(()),
        }
    }
}

/// A passive order observed resting on the venue's book.
///
/// Immutable once observed, apart from removal and shrinking
/// `remaining_quantity` as fills arrive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestingOrder {
    /// Venue-assigned order ID.
    pub order_id: String,
    /// Market ticker.
    pub ticker: String,
    /// Which leg the order rests on.
    pub leg: Leg,
    /// Buy or sell.
    pub action: Action,
    /// Resting price in cents.
    pub price: u32,
    /// Unfilled contracts remaining.
    pub remaining_quantity: u32,
    /// When the venue accepted the order.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_time: Option<OffsetDateTime>,
}

/// A successfully submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Venue-assigned order ID.
    pub order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_buy_construction() {
        let order = OrderRequest::limit_buy("INXD-26AUG", Leg::Yes, 86, 10);
        assert_eq!(order.kind, OrderKind::Limit);
        assert_eq!(order.action, Action::Buy);
        assert_eq!(order.price, Some(86));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn market_buy_carries_no_price() {
        let order = OrderRequest::market_buy("INXD-26AUG", Leg::No, 15);
        assert_eq!(order.kind, OrderKind::Market);
        assert_eq!(order.price, None);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_requests() {
        let no_ticker = OrderRequest::limit_buy("", Leg::Yes, 50, 10);
        assert!(no_ticker.validate().is_err());

        let zero_quantity = OrderRequest::limit_buy("T", Leg::Yes, 50, 0);
        assert!(zero_quantity.validate().is_err());

        let bad_price = OrderRequest::limit_buy("T", Leg::Yes, 100, 10);
        assert!(bad_price.validate().is_err());

        let mut priced_market = OrderRequest::market_buy("T", Leg::Yes, 10);
        priced_market.price = Some(50);
        assert!(priced_market.validate().is_err());

        let mut unpriced_limit = OrderRequest::limit_buy("T", Leg::Yes, 50, 10);
        unpriced_limit.price = None;
        assert!(unpriced_limit.validate().is_err());
    }
}
