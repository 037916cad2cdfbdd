//! Execution engine - bounded-retry fill protocol with exponential backoff
//!
//! Each trade executes on its own task; the backoff pause is an async sleep
//! on that task, so a waiting trade holds no worker thread and no lock.
//! Every failure mode folds into a trade-state transition - nothing escapes
//! `execute_with_retry` except a lookup miss on the trade id.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::ExecutionConfig;
use crate::core::types::{Side, TradeState};
use crate::core::Result;
use crate::feed::PriceFeed;
use crate::registry::TradeRegistry;

pub struct ExecutionEngine {
    registry: Arc<TradeRegistry>,
    feed: Arc<PriceFeed>,
    config: ExecutionConfig,
    rng: Mutex<StdRng>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<TradeRegistry>, feed: Arc<PriceFeed>, config: ExecutionConfig) -> Self {
        Self {
            registry,
            feed,
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Engine with a seeded rng for reproducible runs.
    pub fn with_seed(
        registry: Arc<TradeRegistry>,
        feed: Arc<PriceFeed>,
        config: ExecutionConfig,
        seed: u64,
    ) -> Self {
        Self {
            registry,
            feed,
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Drive a trade to a terminal state or until retries exhaust.
    ///
    /// Attempts run 0..=max_retries. A transient glitch pushes RETRY and
    /// backs off; a candidate price outside the tolerance fraction of the
    /// limit is a terminal rejection; a partial fill consumes the attempt
    /// and continues. A full fill goes EXECUTED → PENDING_CONFIRMATION and
    /// then settles CONFIRMED or, with the configured probability,
    /// CANCELLED. If attempts run out while the trade is partially filled
    /// it stays PARTIALLY_FILLED and its metrics never complete.
    pub async fn execute_with_retry(
        &self,
        trade_id: &str,
        max_retries: u32,
        tolerance_fraction: f64,
    ) -> Result<()> {
        let handle = self.registry.handle(trade_id)?;
        let (isin, side, quantity, limit_price) = {
            let trade = handle.lock();
            (
                trade.isin.clone(),
                trade.side,
                trade.quantity,
                trade.limit_price,
            )
        };

        for attempt in 0..=max_retries {
            if self.chance(self.config.glitch_probability) {
                let exhausted = attempt == max_retries;
                warn!(
                    "trade {}: transient failure on attempt {}/{}",
                    trade_id, attempt, max_retries
                );
                {
                    let mut trade = handle.lock();
                    trade.push_state(TradeState::Retry);
                    if exhausted {
                        trade.push_state(TradeState::Rejected);
                    }
                }
                if exhausted {
                    info!("trade {}: retries exhausted, rejected", trade_id);
                    return Ok(());
                }
                self.backoff(attempt).await;
                continue;
            }

            let mid = self.feed.mid(&isin);
            let candidate = match side {
                Side::Buy => mid + self.config.half_spread,
                Side::Sell => mid - self.config.half_spread,
            };

            // Price drift past the tolerance is a business rejection, not a
            // transient failure - no retry.
            if (candidate - limit_price).abs() / limit_price > tolerance_fraction {
                info!(
                    "trade {}: candidate {:.2} outside tolerance of limit {:.2}, rejected",
                    trade_id, candidate, limit_price
                );
                handle.lock().push_state(TradeState::Rejected);
                return Ok(());
            }

            let chunk = ((quantity as f64 * self.fill_fraction()) as u64).max(1);
            let fully_filled = {
                let mut trade = handle.lock();
                trade.apply_fill(candidate, chunk);
                if trade.filled_quantity < trade.quantity {
                    debug!(
                        "trade {}: partial fill {}/{} @ {:.2}",
                        trade_id, trade.filled_quantity, trade.quantity, candidate
                    );
                    trade.push_state(TradeState::PartiallyFilled);
                    false
                } else {
                    trade.push_state(TradeState::Executed);
                    trade.push_state(TradeState::PendingConfirmation);
                    true
                }
            };

            if !fully_filled {
                // A partial fill consumes the attempt.
                continue;
            }

            if self.chance(self.config.cancel_probability) {
                warn!("trade {}: cancelled after fill", trade_id);
                handle.lock().push_state(TradeState::Cancelled);
            } else {
                info!(
                    "trade {}: filled {} @ {:.2}, confirmed",
                    trade_id, quantity, candidate
                );
                handle.lock().push_state(TradeState::Confirmed);
            }
            return Ok(());
        }

        // Attempts ran out between partial fills: no terminal push. The
        // trade stays PARTIALLY_FILLED and its metrics never complete.
        debug!(
            "trade {}: attempts exhausted while partially filled",
            trade_id
        );
        Ok(())
    }

    /// Executed price minus the instrument's reference average.
    pub fn price_vs_reference(&self, trade_id: &str) -> Result<f64> {
        let trade = self.registry.get(trade_id)?;
        Ok(trade.executed_price - self.feed.reference_average(&trade.isin))
    }

    fn chance(&self, probability: f64) -> bool {
        self.rng.lock().random::<f64>() < probability
    }

    fn fill_fraction(&self) -> f64 {
        let (min, max) = (self.config.fill_fraction_min, self.config.fill_fraction_max);
        if min < max {
            self.rng.lock().random_range(min..max)
        } else {
            // Degenerate window pins the fraction.
            min
        }
    }

    async fn backoff(&self, attempt: u32) {
        let exp = self.config.backoff_base_ms as f64 * 2f64.powi(attempt as i32);
        let delay_ms = (exp as u64).min(self.config.backoff_cap_ms);
        debug!("trade backoff: {}ms before attempt {}", delay_ms, attempt + 1);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
