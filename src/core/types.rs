//! Core types - trade lifecycle domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Trade lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeState {
    Created,
    PartiallyFilled,
    Executed,
    PendingConfirmation,
    Retry,
    Confirmed,
    Cancelled,
    Rejected,
}

impl TradeState {
    /// A terminal state never transitions again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TradeState::Confirmed | TradeState::Cancelled | TradeState::Rejected
        )
    }

    /// Legal edges of the lifecycle state machine.
    pub fn can_transition(self, next: TradeState) -> bool {
        use TradeState::*;
        match self {
            // A fill attempt (first, after a partial, or after a retry) may
            // fully fill, partially fill, reject, or hit a transient failure.
            Created | PartiallyFilled | Retry => {
                matches!(next, Executed | PartiallyFilled | Rejected | Retry)
            }
            Executed => matches!(next, PendingConfirmation),
            PendingConfirmation => matches!(next, Confirmed | Cancelled),
            Confirmed | Cancelled | Rejected => false,
        }
    }
}

impl std::fmt::Display for TradeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TradeState::Created => "CREATED",
            TradeState::PartiallyFilled => "PARTIALLY_FILLED",
            TradeState::Executed => "EXECUTED",
            TradeState::PendingConfirmation => "PENDING_CONFIRMATION",
            TradeState::Retry => "RETRY",
            TradeState::Confirmed => "CONFIRMED",
            TradeState::Cancelled => "CANCELLED",
            TradeState::Rejected => "REJECTED",
        };
        write!(f, "{}", name)
    }
}

/// Instrument static reference data - immutable after seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub isin: String,
    pub currency: String,
    pub spread_ticks: u32,
    pub reference_price: f64,
}

impl Instrument {
    pub fn new(
        isin: impl Into<String>,
        currency: impl Into<String>,
        spread_ticks: u32,
        reference_price: f64,
    ) -> Self {
        Self {
            isin: isin.into(),
            currency: currency.into(),
            spread_ticks,
            reference_price,
        }
    }
}

/// Per-trade execution metrics, completed exactly once on the first
/// terminal transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub trade_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub partial_fill_count: u32,
    pub execution_latency_ms: Option<u64>,
    pub final_state: Option<TradeState>,
}

impl TradeMetrics {
    pub fn new(trade_id: impl Into<String>) -> Self {
        Self {
            trade_id: trade_id.into(),
            started_at: Utc::now(),
            completed_at: None,
            retry_count: 0,
            partial_fill_count: 0,
            execution_latency_ms: None,
            final_state: None,
        }
    }

    pub fn record_retry(&mut self) {
        self.retry_count += 1;
    }

    pub fn record_partial_fill(&mut self) {
        self.partial_fill_count += 1;
    }

    /// Seal the metrics. Later calls are ignored - latency and final state
    /// never change after the first terminal transition.
    pub fn complete(&mut self, state: TradeState) {
        if self.final_state.is_some() {
            return;
        }
        let now = Utc::now();
        self.execution_latency_ms = Some((now - self.started_at).num_milliseconds().max(0) as u64);
        self.completed_at = Some(now);
        self.final_state = Some(state);
    }

    /// One-line render for logs and reports.
    pub fn summary(&self) -> String {
        format!(
            "trade {}: latency={}ms retries={} partial_fills={} final={}",
            self.trade_id,
            self.execution_latency_ms
                .map_or_else(|| "-".to_string(), |ms| ms.to_string()),
            self.retry_count,
            self.partial_fill_count,
            self.final_state
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
        )
    }
}

/// A single trade order and its full lifecycle record.
///
/// The registry owns every trade behind a per-trade lock; all mutation goes
/// through [`Trade::push_state`] and [`Trade::apply_fill`] so the state
/// field, the history append, and the metrics update are observed together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub isin: String,
    pub trader_id: String,
    pub side: Side,
    pub quantity: u64,
    pub limit_price: f64,
    pub executed_price: f64,
    pub filled_quantity: u64,
    pub state: TradeState,
    pub history: Vec<TradeState>,
    pub created_at: DateTime<Utc>,
    pub metrics: TradeMetrics,
}

impl Trade {
    pub fn new(
        id: impl Into<String>,
        isin: impl Into<String>,
        trader_id: impl Into<String>,
        side: Side,
        quantity: u64,
        limit_price: f64,
    ) -> Self {
        let id = id.into();
        Self {
            metrics: TradeMetrics::new(id.clone()),
            id,
            isin: isin.into(),
            trader_id: trader_id.into(),
            side,
            quantity,
            limit_price,
            executed_price: 0.0,
            filled_quantity: 0,
            state: TradeState::Created,
            history: vec![TradeState::Created],
            created_at: Utc::now(),
        }
    }

    /// Advance the lifecycle: set state, append history, sync metrics.
    pub fn push_state(&mut self, next: TradeState) {
        debug_assert!(
            self.state.can_transition(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
        match next {
            TradeState::Retry => self.metrics.record_retry(),
            TradeState::PartiallyFilled => self.metrics.record_partial_fill(),
            s if s.is_terminal() => self.metrics.complete(s),
            _ => {}
        }
    }

    /// Record a fill chunk at the given price, clipped to the unfilled
    /// remainder. Filled quantity never decreases and never exceeds the
    /// requested quantity.
    pub fn apply_fill(&mut self, price: f64, chunk: u64) {
        let applied = chunk.min(self.remaining());
        self.executed_price = price;
        self.filled_quantity += applied;
    }

    pub fn remaining(&self) -> u64 {
        self.quantity - self.filled_quantity
    }

    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.limit_price
    }
}
