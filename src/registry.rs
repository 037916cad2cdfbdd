//! Trade registry - owns every in-flight and completed trade

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::core::types::{Side, Trade, TradeMetrics, TradeState};
use crate::core::{Error, Result};
use crate::instruments::InstrumentStore;

/// Owns the set of trades, keyed by trade id. Each trade sits behind its
/// own lock, so transitions on one trade serialize while independent trades
/// never contend; the outer map lock only guards insert/lookup.
pub struct TradeRegistry {
    instruments: Arc<InstrumentStore>,
    trades: RwLock<HashMap<String, Arc<Mutex<Trade>>>>,
}

impl TradeRegistry {
    pub fn new(instruments: Arc<InstrumentStore>) -> Self {
        Self {
            instruments,
            trades: RwLock::new(HashMap::new()),
        }
    }

    pub fn instruments(&self) -> &InstrumentStore {
        &self.instruments
    }

    /// Create a trade in state CREATED with a fresh metrics record.
    /// Fails on unknown instrument, non-positive quantity or limit price,
    /// or a duplicate trade id. Returns a snapshot of the new trade.
    pub fn create(
        &self,
        id: &str,
        isin: &str,
        trader_id: &str,
        side: Side,
        quantity: u64,
        limit_price: f64,
    ) -> Result<Trade> {
        self.instruments.require(isin)?;
        if quantity == 0 {
            return Err(Error::Trading(format!(
                "trade {}: quantity must be positive",
                id
            )));
        }
        if !limit_price.is_finite() || limit_price <= 0.0 {
            return Err(Error::Trading(format!(
                "trade {}: limit price must be positive, got {}",
                id, limit_price
            )));
        }

        let trade = Trade::new(id, isin, trader_id, side, quantity, limit_price);
        let snapshot = trade.clone();

        let mut trades = self.trades.write();
        if trades.contains_key(id) {
            return Err(Error::Trading(format!("duplicate trade id: {}", id)));
        }
        trades.insert(id.to_string(), Arc::new(Mutex::new(trade)));
        drop(trades);

        info!(
            "created trade {}: {} {} {} @ {:.2} for {}",
            id, side, quantity, isin, limit_price, trader_id
        );
        Ok(snapshot)
    }

    /// Hand out the per-trade lock. The engine is the single writer; any
    /// reader going through [`TradeRegistry::get`] sees transitions whole.
    pub(crate) fn handle(&self, id: &str) -> Result<Arc<Mutex<Trade>>> {
        self.trades
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::TradeNotFound(id.to_string()))
    }

    /// Snapshot of the trade as of now.
    pub fn get(&self, id: &str) -> Result<Trade> {
        Ok(self.handle(id)?.lock().clone())
    }

    /// Ordered state history, CREATED first.
    pub fn history(&self, id: &str) -> Result<Vec<TradeState>> {
        Ok(self.handle(id)?.lock().history.clone())
    }

    pub fn metrics(&self, id: &str) -> Result<TradeMetrics> {
        Ok(self.handle(id)?.lock().metrics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TradeRegistry {
        TradeRegistry::new(Arc::new(InstrumentStore::with_defaults()))
    }

    #[test]
    fn test_create_and_get() {
        let registry = registry();
        let trade = registry
            .create("tr-1", "US0000000001", "T1", Side::Buy, 100, 5.0)
            .unwrap();
        assert_eq!(trade.state, TradeState::Created);

        let fetched = registry.get("tr-1").unwrap();
        assert_eq!(fetched.id, "tr-1");
        assert_eq!(fetched.quantity, 100);
        assert_eq!(registry.history("tr-1").unwrap(), vec![TradeState::Created]);
        assert_eq!(registry.metrics("tr-1").unwrap().retry_count, 0);
    }

    #[test]
    fn test_unknown_instrument_rejected() {
        let registry = registry();
        assert!(matches!(
            registry.create("tr-1", "XX0000000000", "T1", Side::Buy, 100, 5.0),
            Err(Error::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let registry = registry();
        assert!(registry
            .create("tr-1", "US0000000001", "T1", Side::Buy, 0, 5.0)
            .is_err());
        assert!(registry
            .create("tr-2", "US0000000001", "T1", Side::Buy, 100, 0.0)
            .is_err());
        assert!(registry
            .create("tr-3", "US0000000001", "T1", Side::Buy, 100, f64::NAN)
            .is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let registry = registry();
        registry
            .create("tr-1", "US0000000001", "T1", Side::Buy, 100, 5.0)
            .unwrap();
        assert!(matches!(
            registry.create("tr-1", "US0000000002", "T2", Side::Sell, 10, 4.0),
            Err(Error::Trading(_))
        ));
    }

    #[test]
    fn test_lookup_miss_is_not_found() {
        let registry = registry();
        assert!(matches!(
            registry.get("missing"),
            Err(Error::TradeNotFound(_))
        ));
        assert!(matches!(
            registry.history("missing"),
            Err(Error::TradeNotFound(_))
        ));
    }
}
