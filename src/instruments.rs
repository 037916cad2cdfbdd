//! Instrument reference data store

use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;

use crate::core::types::Instrument;
use crate::core::{Error, Result};

/// Static instrument reference data, keyed by ISIN. Immutable after
/// seeding; concurrent lookups never contend with each other.
pub struct InstrumentStore {
    instruments: RwLock<HashMap<String, Instrument>>,
}

impl InstrumentStore {
    pub fn new() -> Self {
        Self {
            instruments: RwLock::new(HashMap::new()),
        }
    }

    /// Store seeded with the stock simulation universe. Reference prices
    /// start at a uniform-random level in [2.0, 8.0).
    pub fn with_defaults() -> Self {
        let store = Self::new();
        let mut rng = rand::rng();
        for (isin, currency, spread_ticks) in [
            ("US0000000001", "USD", 5),
            ("US0000000002", "USD", 10),
            ("GB0000000003", "GBP", 7),
        ] {
            store.insert(Instrument::new(
                isin,
                currency,
                spread_ticks,
                rng.random_range(2.0..8.0),
            ));
        }
        store
    }

    pub fn insert(&self, instrument: Instrument) {
        self.instruments
            .write()
            .insert(instrument.isin.clone(), instrument);
    }

    pub fn get(&self, isin: &str) -> Option<Instrument> {
        self.instruments.read().get(isin).cloned()
    }

    /// Lookup that surfaces unknown instruments as an admission error.
    pub fn require(&self, isin: &str) -> Result<Instrument> {
        self.get(isin)
            .ok_or_else(|| Error::UnknownInstrument(isin.to_string()))
    }

    pub fn isins(&self) -> Vec<String> {
        self.instruments.read().keys().cloned().collect()
    }
}

impl Default for InstrumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_seeded() {
        let store = InstrumentStore::with_defaults();
        let instrument = store.require("US0000000001").unwrap();
        assert_eq!(instrument.currency, "USD");
        assert_eq!(instrument.spread_ticks, 5);
        assert!((2.0..8.0).contains(&instrument.reference_price));
        assert_eq!(store.isins().len(), 3);
    }

    #[test]
    fn test_unknown_isin_is_an_error() {
        let store = InstrumentStore::with_defaults();
        assert!(matches!(
            store.require("XX0000000000"),
            Err(Error::UnknownInstrument(_))
        ));
    }
}
