//! Synthetic market data feed - per-instrument random-walk mid prices

use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::FeedConfig;

/// Maintains a mid price per instrument, advanced on a fixed interval by a
/// bounded random walk. Shared by every trade on the instrument and by the
/// ticker task; reads always observe a fully-applied update.
pub struct PriceFeed {
    config: FeedConfig,
    mids: Arc<RwLock<HashMap<String, f64>>>,
}

impl PriceFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            mids: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a mid price without starting periodic updates. Idempotent - a
    /// later seed for an already-known instrument is ignored. Returns
    /// whether the instrument was newly registered.
    pub fn register(&self, isin: &str, initial_mid: f64) -> bool {
        let mut mids = self.mids.write();
        if mids.contains_key(isin) {
            return false;
        }
        mids.insert(isin.to_string(), initial_mid);
        info!("feed: registered {} @ {:.2}", isin, initial_mid);
        true
    }

    /// Register an instrument and begin periodic random-walk updates.
    /// Idempotent - a second call for the same instrument is ignored, even
    /// with a different seed.
    pub fn start(&self, isin: &str, initial_mid: f64) {
        if !self.register(isin, initial_mid) {
            debug!("feed: {} already ticking, seed {:.2} ignored", isin, initial_mid);
            return;
        }
        let interval_ms = self.config.tick_interval_ms;
        let range = self.config.tick_range;
        if interval_ms == 0 || range <= 0.0 {
            // Degenerate config: the price stays at its seed.
            return;
        }

        let mids = Arc::clone(&self.mids);
        let isin = isin.to_string();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            loop {
                ticker.tick().await;
                let delta = rand::rng().random_range(-range..range);
                let mut mids = mids.write();
                if let Some(mid) = mids.get_mut(&isin) {
                    *mid += delta;
                }
            }
        });
    }

    /// Current mid price, or the configured fallback if the instrument was
    /// never registered.
    pub fn mid(&self, isin: &str) -> f64 {
        self.mids
            .read()
            .get(isin)
            .copied()
            .unwrap_or(self.config.fallback_mid)
    }

    /// Trailing-average proxy. No separate window is tracked - this equals
    /// the current mid.
    pub fn reference_average(&self, isin: &str) -> f64 {
        self.mid(isin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_feed() -> PriceFeed {
        // No ticking: prices stay wherever they were seeded.
        PriceFeed::new(FeedConfig {
            tick_interval_ms: 0,
            tick_range: 0.0,
            fallback_mid: 100.0,
        })
    }

    #[test]
    fn test_fallback_for_unknown_instrument() {
        let feed = static_feed();
        assert_eq!(feed.mid("US0000000001"), 100.0);
    }

    #[test]
    fn test_register_and_read() {
        let feed = static_feed();
        assert!(feed.register("US0000000001", 5.25));
        assert_eq!(feed.mid("US0000000001"), 5.25);
        assert_eq!(feed.reference_average("US0000000001"), 5.25);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let feed = static_feed();
        feed.start("US0000000001", 5.25);
        feed.start("US0000000001", 9.99);
        assert_eq!(feed.mid("US0000000001"), 5.25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_walk_stays_bounded() {
        let feed = PriceFeed::new(FeedConfig {
            tick_interval_ms: 300,
            tick_range: 0.5,
            fallback_mid: 100.0,
        });
        feed.start("US0000000001", 5.0);

        // Let ten ticks elapse on the paused clock.
        for _ in 0..10 {
            tokio::time::advance(Duration::from_millis(300)).await;
            tokio::task::yield_now().await;
        }

        let mid = feed.mid("US0000000001");
        assert!(mid.is_finite());
        // Eleven ticks at most (the interval fires once immediately), each
        // bounded by ±0.5.
        assert!((mid - 5.0).abs() <= 11.0 * 0.5);
    }
}
