//! Penny-quoting decision engine.
//!
//! Each tick the engine evaluates every configured (ticker, leg) key
//! against an immutable snapshot of books, resting orders, and positions,
//! and either emits a quote intent one cent in front of the best bid or
//! vetoes the key for the tick. Evaluation is pure over the snapshot; the
//! only state carried across ticks is the per-key pending deadline and the
//! last price placed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::market::{Leg, QuoteMode};
use crate::metrics;
use crate::orderbook::{best_bid, best_bid_with_depth, OrderBook};
use crate::trading::{PositionBook, RestingOrder};

/// Thresholds governing quote eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePolicy {
    /// Only quote when the best bid is strictly below this price (cents).
    pub max_bid_price: u32,
    /// Only quote when the quantity resting at the best bid strictly
    /// exceeds this many contracts.
    pub min_depth_at_best: u32,
    /// Stop quoting a leg once exposure on it exceeds this many contracts.
    pub position_limit: i64,
    /// Contracts per resting quote.
    pub quote_size: u32,
    /// How long a key stays pending after an intent is emitted.
    pub pending_grace: Duration,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self {
            max_bid_price: 90,
            min_depth_at_best: 69,
            position_limit: 50,
            quote_size: 10,
            pending_grace: Duration::from_secs(2),
        }
    }
}

/// A (ticker, leg) pair: the unit of quoting state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    /// Market ticker.
    pub ticker: String,
    /// The leg being quoted.
    pub leg: Leg,
}

impl QuoteKey {
    /// Create a new key.
    pub fn new(ticker: impl Into<String>, leg: Leg) -> Self {
        Self {
            ticker: ticker.into(),
            leg,
        }
    }
}

impl fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ticker, self.leg)
    }
}

/// Per-key state carried between ticks.
#[derive(Debug, Clone, Copy, Default)]
struct EngineState {
    /// Until this instant the key is suppressed, giving the venue's
    /// resting-order list time to reflect an emitted quote.
    pending_until: Option<Instant>,
    /// Price of the last intent emitted for this key. Identical consecutive
    /// targets are vetoed; once the target moves, the old price may repeat.
    last_placed_price: Option<u32>,
}

/// An instruction to place a passive limit buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteIntent {
    /// Market ticker.
    pub ticker: String,
    /// The leg to quote.
    pub leg: Leg,
    /// Limit price in cents (one above the best bid).
    pub price: u32,
    /// Contracts to rest.
    pub quantity: u32,
}

/// Why a key produced no quote this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Veto {
    /// A recent intent is still within its grace window.
    Pending,
    /// An order already rests on this key.
    ExistingOrder,
    /// The leg has no resting bid to price against.
    NoBid,
    /// The best bid has run too close to certainty.
    BidAboveCap {
        /// Observed best bid in cents.
        best_bid: u32,
    },
    /// Not enough contracts resting at the best bid.
    ThinDepth {
        /// Observed depth at the best bid.
        depth: u32,
    },
    /// Exposure on this leg exceeds the position limit.
    PositionLimit {
        /// Signed exposure on the leg.
        position: i64,
    },
    /// The target equals the last price placed for this key.
    StalePrice {
        /// The repeated target price.
        price: u32,
    },
    /// Bidding one more cent would lift the derived ask.
    WouldCross {
        /// The penny-in-front target.
        target: u32,
        /// The derived ask it would cross.
        ask: u32,
    },
}

impl Veto {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Veto::Pending => "pending",
            Veto::ExistingOrder => "existing_order",
            Veto::NoBid => "no_bid",
            Veto::BidAboveCap { .. } => "bid_above_cap",
            Veto::ThinDepth { .. } => "thin_depth",
            Veto::PositionLimit { .. } => "position_limit",
            Veto::StalePrice { .. } => "stale_price",
            Veto::WouldCross { .. } => "would_cross",
        }
    }
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Veto::Pending => write!(f, "placement pending"),
            Veto::ExistingOrder => write!(f, "order already resting"),
            Veto::NoBid => write!(f, "no resting bid"),
            Veto::BidAboveCap { best_bid } => write!(f, "best bid {best_bid} at or above cap"),
            Veto::ThinDepth { depth } => write!(f, "only {depth} contracts at best bid"),
            Veto::PositionLimit { position } => write!(f, "exposure {position} over limit"),
            Veto::StalePrice { price } => write!(f, "target {price} unchanged since last quote"),
            Veto::WouldCross { target, ask } => {
                write!(f, "target {target} would cross derived ask {ask}")
            }
        }
    }
}

/// Outcome of evaluating a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Place a quote.
    Quote(QuoteIntent),
    /// Do nothing this tick.
    Veto(Veto),
}

/// Running counters exposed on the status endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EngineStats {
    /// Ticks evaluated.
    pub ticks: u64,
    /// Quote intents emitted.
    pub quotes_emitted: u64,
    /// Key evaluations vetoed.
    pub vetoes: u64,
}

/// Immutable world-state a tick evaluates against.
///
/// The three reads are not atomic with one another; the engine treats the
/// snapshot as the truth for the tick regardless.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    /// When the snapshot was assembled.
    pub taken_at: Instant,
    /// Fetched books by ticker. A ticker missing here reads as bidless.
    pub books: HashMap<String, OrderBook>,
    /// All resting orders across markets.
    pub resting: Vec<RestingOrder>,
    /// Signed positions across markets.
    pub positions: PositionBook,
}

impl TickSnapshot {
    /// Empty snapshot taken now.
    pub fn new() -> Self {
        Self {
            taken_at: Instant::now(),
            books: HashMap::new(),
            resting: Vec::new(),
            positions: PositionBook::new(),
        }
    }
}

impl Default for TickSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// The per-tick decision engine.
#[derive(Debug)]
pub struct QuoteEngine {
    policy: QuotePolicy,
    /// Quoting mode per ticker. BTreeMap so evaluation order is stable.
    modes: BTreeMap<String, QuoteMode>,
    states: HashMap<QuoteKey, EngineState>,
    stats: EngineStats,
}

impl QuoteEngine {
    /// Create an engine with the given policy and ticker modes.
    pub fn new(policy: QuotePolicy, modes: impl IntoIterator<Item = (String, QuoteMode)>) -> Self {
        Self {
            policy,
            modes: modes.into_iter().collect(),
            states: HashMap::new(),
            stats: EngineStats::default(),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &QuotePolicy {
        &self.policy
    }

    /// Tickers currently being quoted, with their modes.
    pub fn modes(&self) -> impl Iterator<Item = (&str, QuoteMode)> {
        self.modes.iter().map(|(t, &m)| (t.as_str(), m))
    }

    /// Running counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Set the quoting mode for a ticker. Switching a ticker off drops its
    /// per-key state, so re-enabling starts fresh.
    pub fn set_mode(&mut self, ticker: impl Into<String>, mode: QuoteMode) {
        let ticker = ticker.into();
        if mode.is_active() {
            self.modes.insert(ticker, mode);
        } else {
            self.modes.remove(&ticker);
            self.states.retain(|key, _| key.ticker != ticker);
        }
    }

    /// Evaluate one tick against a snapshot, returning the intents to place.
    ///
    /// Emitting an intent immediately marks its key pending and records the
    /// target price, whether or not the caller's placement later succeeds;
    /// the grace window absorbs the uncertainty either way.
    pub fn evaluate(&mut self, snapshot: &TickSnapshot) -> Vec<QuoteIntent> {
        self.stats.ticks += 1;
        let mut intents = Vec::new();

        for (ticker, mode) in &self.modes {
            for &leg in mode.legs() {
                let key = QuoteKey::new(ticker.clone(), leg);
                let state = self.states.entry(key.clone()).or_default();

                match evaluate_key(&self.policy, &key, state, snapshot) {
                    Decision::Quote(intent) => {
                        info!(key = %key, price = intent.price, quantity = intent.quantity, "Quoting");
                        state.pending_until = Some(snapshot.taken_at + self.policy.pending_grace);
                        state.last_placed_price = Some(intent.price);
                        self.stats.quotes_emitted += 1;
                        intents.push(intent);
                    }
                    Decision::Veto(veto) => {
                        debug!(key = %key, reason = veto.reason(), "No quote: {veto}");
                        metrics::inc_quote_vetoes(veto.reason());
                        self.stats.vetoes += 1;
                    }
                }
            }
        }

        intents
    }
}

/// Evaluate a single key against a snapshot. Pure: touches no state beyond
/// reading it.
fn evaluate_key(
    policy: &QuotePolicy,
    key: &QuoteKey,
    state: &EngineState,
    snapshot: &TickSnapshot,
) -> Decision {
    if let Some(until) = state.pending_until {
        if snapshot.taken_at < until {
            return Decision::Veto(Veto::Pending);
        }
    }

    if snapshot
        .resting
        .iter()
        .any(|o| o.ticker == key.ticker && o.leg == key.leg)
    {
        return Decision::Veto(Veto::ExistingOrder);
    }

    // An unfetched book reads the same as a bidless one.
    let bids = snapshot
        .books
        .get(&key.ticker)
        .map(|book| book.bids(key.leg))
        .unwrap_or_default();

    let Some((best, depth)) = best_bid_with_depth(bids) else {
        return Decision::Veto(Veto::NoBid);
    };

    if best >= policy.max_bid_price {
        return Decision::Veto(Veto::BidAboveCap { best_bid: best });
    }

    if depth <= policy.min_depth_at_best {
        return Decision::Veto(Veto::ThinDepth { depth });
    }

    let position = snapshot.positions.exposure(&key.ticker, key.leg);
    if position > policy.position_limit {
        return Decision::Veto(Veto::PositionLimit { position });
    }

    let target = best + 1;

    if state.last_placed_price == Some(target) {
        return Decision::Veto(Veto::StalePrice { price: target });
    }

    // The ask on this leg is derived from the opposing leg's best bid.
    if let Some(opposite_bid) = snapshot
        .books
        .get(&key.ticker)
        .and_then(|book| best_bid(book.bids(key.leg.opposite())))
    {
        let ask = 100 - opposite_bid;
        if target >= ask {
            return Decision::Veto(Veto::WouldCross { target, ask });
        }
    }

    Decision::Quote(QuoteIntent {
        ticker: key.ticker.clone(),
        leg: key.leg,
        price: target,
        quantity: policy.quote_size,
    })
}
