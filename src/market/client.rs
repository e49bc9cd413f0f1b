//! Venue REST API client.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{MarketError, TradingError};
use crate::market::Leg;
use crate::orderbook::{OrderBook, PriceLevel};
use crate::trading::{Action, OrderKind, OrderRequest, PlacedOrder, PositionBook, RestingOrder};

use super::feed::{MarketDataFeed, OrderGateway};

/// Client for the venue's trading REST API.
#[derive(Debug, Clone)]
pub struct KalshiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the trade API.
    api_base: String,
    /// Optional bearer token.
    api_key: Option<String>,
}

/// Orderbook response wrapper.
#[derive(Debug, Clone, Deserialize)]
struct OrderbookResponse {
    orderbook: Option<RawOrderbook>,
}

/// Raw orderbook payload; either side may be absent or null.
#[derive(Debug, Clone, Deserialize)]
struct RawOrderbook {
    yes: Option<Vec<PriceLevel>>,
    no: Option<Vec<PriceLevel>>,
}

/// Positions response wrapper.
#[derive(Debug, Clone, Deserialize)]
struct PositionsResponse {
    #[serde(default)]
    market_positions: Vec<RawPosition>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPosition {
    ticker: String,
    /// Signed contracts: positive long "yes", negative long "no".
    position: i64,
}

/// Orders response wrapper.
#[derive(Debug, Clone, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<RawOrder>,
}

/// Raw resting order. The venue reports the price on whichever leg the
/// order rests, in leg-native cents.
#[derive(Debug, Clone, Deserialize)]
struct RawOrder {
    order_id: String,
    ticker: String,
    side: Leg,
    action: Action,
    yes_price: Option<u32>,
    no_price: Option<u32>,
    remaining_count: u32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    created_time: Option<time::OffsetDateTime>,
}

impl RawOrder {
    fn into_resting(self) -> Option<RestingOrder> {
        let price = match self.side {
            Leg::Yes => self.yes_price,
            Leg::No => self.no_price,
        }?;
        Some(RestingOrder {
            order_id: self.order_id,
            ticker: self.ticker,
            leg: self.side,
            action: self.action,
            price,
            remaining_quantity: self.remaining_count,
            created_time: self.created_time,
        })
    }
}

/// Order placement payload, leg price keyed the way the venue expects.
#[derive(Debug, Clone, Serialize)]
struct OrderPayload<'a> {
    ticker: &'a str,
    side: Leg,
    action: Action,
    count: u32,
    #[serde(rename = "type")]
    kind: OrderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    yes_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_price: Option<u32>,
}

/// Order placement response wrapper.
#[derive(Debug, Clone, Deserialize)]
struct PlaceOrderResponse {
    order: Option<PlacedOrderBody>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlacedOrderBody {
    order_id: String,
}

/// Account balance snapshot, in cents.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Balance {
    /// Available cash in cents.
    pub balance: i64,
    /// Total portfolio value in cents, when the venue reports it.
    pub portfolio_value: Option<i64>,
}

impl KalshiClient {
    /// Create a new client from config with tuned HTTP settings.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(std::time::Duration::from_millis(500))
            // TCP_NODELAY for low-latency (disable Nagle's algorithm)
            .tcp_nodelay(true)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            api_base: config.kalshi_api_base.clone(),
            api_key: config.kalshi_api_key.clone(),
        }
    }

    /// Get the HTTP client reference.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{}", self.api_base, path)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Get the account balance in cents.
    #[instrument(skip(self))]
    pub async fn balance(&self) -> Result<Balance, MarketError> {
        let response = self.get("/portfolio/balance").send().await?;

        if !response.status().is_success() {
            return Err(MarketError::FetchFailed {
                what: "balance",
                ticker: "-".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let balance: Balance = response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("failed to parse balance: {e}")))?;

        debug!(cents = balance.balance, "Retrieved balance");
        Ok(balance)
    }
}

#[async_trait::async_trait]
impl MarketDataFeed for KalshiClient {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn orderbook(&self, ticker: &str) -> Result<OrderBook, MarketError> {
        let timer = crate::metrics::timer_book_fetch();

        let response = self
            .get(&format!("/markets/{ticker}/orderbook"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::FetchFailed {
                what: "orderbook",
                ticker: ticker.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body: OrderbookResponse = response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("failed to parse orderbook: {e}")))?;

        drop(timer);

        let raw = body.orderbook.unwrap_or(RawOrderbook {
            yes: None,
            no: None,
        });
        Ok(OrderBook::new(
            raw.yes.unwrap_or_default(),
            raw.no.unwrap_or_default(),
        ))
    }

    #[instrument(skip(self))]
    async fn positions(&self) -> Result<PositionBook, MarketError> {
        let response = self.get("/portfolio/positions").send().await?;

        if !response.status().is_success() {
            return Err(MarketError::FetchFailed {
                what: "positions",
                ticker: "-".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body: PositionsResponse = response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("failed to parse positions: {e}")))?;

        Ok(body
            .market_positions
            .into_iter()
            .map(|p| (p.ticker, p.position))
            .collect())
    }

    #[instrument(skip(self))]
    async fn resting_orders(&self) -> Result<Vec<RestingOrder>, MarketError> {
        let response = self
            .get("/portfolio/orders")
            .query(&[("status", "resting")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::FetchFailed {
                what: "orders",
                ticker: "-".to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body: OrdersResponse = response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("failed to parse orders: {e}")))?;

        let orders: Vec<RestingOrder> = body
            .orders
            .into_iter()
            .filter_map(|raw| {
                let id = raw.order_id.clone();
                let order = raw.into_resting();
                if order.is_none() {
                    warn!(order_id = %id, "Resting order missing leg price, skipping");
                }
                order
            })
            .collect();

        debug!(count = orders.len(), "Retrieved resting orders");
        Ok(orders)
    }
}

#[async_trait::async_trait]
impl OrderGateway for KalshiClient {
    #[instrument(skip(self, request), fields(ticker = %request.ticker, leg = %request.leg))]
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, TradingError> {
        request
            .validate()
            .map_err(TradingError::InvalidParams)?;

        let payload = OrderPayload {
            ticker: &request.ticker,
            side: request.leg,
            action: request.action,
            count: request.quantity,
            kind: request.kind,
            yes_price: (request.leg == Leg::Yes).then_some(request.price).flatten(),
            no_price: (request.leg == Leg::No).then_some(request.price).flatten(),
        };

        let response = self
            .authorize(self.http.post(format!("{}/portfolio/orders", self.api_base)))
            .json(&payload)
            .send()
            .await
            .map_err(|e| TradingError::SubmissionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TradingError::RateLimited {
                retry_after_seconds: 1,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradingError::OrderRejected {
                reason: format!("HTTP {status} - {body}"),
            });
        }

        let body: PlaceOrderResponse = response
            .json()
            .await
            .map_err(|e| TradingError::SubmissionFailed(format!("failed to parse order: {e}")))?;

        let order = body
            .order
            .ok_or_else(|| TradingError::SubmissionFailed("response carried no order".into()))?;

        Ok(PlacedOrder {
            order_id: order.order_id,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, order_id: &str) -> Result<(), TradingError> {
        let response = self
            .authorize(
                self.http
                    .delete(format!("{}/portfolio/orders/{order_id}", self.api_base)),
            )
            .send()
            .await
            .map_err(|e| TradingError::CancelFailed {
                order_id: order_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TradingError::CancelFailed {
                order_id: order_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_order_maps_price_from_its_leg() {
        let raw = RawOrder {
            order_id: "ord-1".to_string(),
            ticker: "TEST".to_string(),
            side: Leg::No,
            action: Action::Buy,
            yes_price: Some(88),
            no_price: Some(12),
            remaining_count: 10,
            created_time: None,
        };

        let order = raw.into_resting().unwrap();
        assert_eq!(order.leg, Leg::No);
        assert_eq!(order.price, 12);
    }

    #[test]
    fn raw_order_without_leg_price_is_dropped() {
        let raw = RawOrder {
            order_id: "ord-1".to_string(),
            ticker: "TEST".to_string(),
            side: Leg::Yes,
            action: Action::Buy,
            yes_price: None,
            no_price: Some(12),
            remaining_count: 10,
            created_time: None,
        };

        assert!(raw.into_resting().is_none());
    }

    #[test]
    fn order_payload_keys_price_by_leg() {
        let request = OrderRequest::limit_buy("TEST", Leg::No, 12, 10);
        let payload = OrderPayload {
            ticker: &request.ticker,
            side: request.leg,
            action: request.action,
            count: request.quantity,
            kind: request.kind,
            yes_price: (request.leg == Leg::Yes).then_some(request.price).flatten(),
            no_price: (request.leg == Leg::No).then_some(request.price).flatten(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["no_price"], 12);
        assert_eq!(json.get("yes_price"), None);
        assert_eq!(json["type"], "limit");
        assert_eq!(json["side"], "no");
    }

    #[test]
    fn orderbook_response_tolerates_null_sides() {
        let body: OrderbookResponse =
            serde_json::from_str(r#"{"orderbook": {"yes": [[85, 70]], "no": null}}"#).unwrap();
        let raw = body.orderbook.unwrap();
        assert_eq!(raw.yes.unwrap().len(), 1);
        assert!(raw.no.is_none());
    }
}
