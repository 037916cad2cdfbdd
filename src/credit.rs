//! Credit ledger - trader exposure limits and admission checks

use parking_lot::{Mutex, RwLock};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{Error, Result};

/// A trader's static limits and cumulative committed exposure.
///
/// Exposure is a monotonic accumulator over the trader's lifetime in this
/// process - no decrement operation exists in this model. Concurrent
/// additions from trades on the same trader are serialized by the lock.
pub struct Trader {
    pub id: String,
    pub max_per_trade_limit: Decimal,
    pub max_exposure: Decimal,
    exposure: Mutex<Decimal>,
}

impl Trader {
    pub fn new(
        id: impl Into<String>,
        max_per_trade_limit: impl Into<Decimal>,
        max_exposure: impl Into<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            max_per_trade_limit: max_per_trade_limit.into(),
            max_exposure: max_exposure.into(),
            exposure: Mutex::new(Decimal::ZERO),
        }
    }

    pub fn exposure(&self) -> Decimal {
        *self.exposure.lock()
    }

    /// Accumulate committed notional and return the new total.
    pub fn add_exposure(&self, notional: Decimal) -> Decimal {
        let mut exposure = self.exposure.lock();
        *exposure += notional;
        *exposure
    }
}

/// Registry of traders plus pure admission checks. Admission never mutates
/// exposure - committing is the caller's call, via [`Trader::add_exposure`].
pub struct CreditLedger {
    traders: RwLock<HashMap<String, Arc<Trader>>>,
}

impl CreditLedger {
    pub fn new() -> Self {
        Self {
            traders: RwLock::new(HashMap::new()),
        }
    }

    /// Ledger seeded with the stock simulation traders.
    pub fn with_default_traders() -> Self {
        let ledger = Self::new();
        ledger.register(Trader::new("T1", 5_000_000u64, 20_000_000u64));
        ledger.register(Trader::new("T2", 10_000_000u64, 40_000_000u64));
        ledger
    }

    pub fn register(&self, trader: Trader) -> Arc<Trader> {
        let trader = Arc::new(trader);
        self.traders
            .write()
            .insert(trader.id.clone(), Arc::clone(&trader));
        trader
    }

    pub fn trader(&self, trader_id: &str) -> Result<Arc<Trader>> {
        self.traders
            .read()
            .get(trader_id)
            .cloned()
            .ok_or_else(|| Error::UnknownTrader(trader_id.to_string()))
    }

    /// True iff current exposure plus the notional stays within the
    /// trader's exposure cap.
    pub fn can_admit(&self, trader_id: &str, notional: f64) -> Result<bool> {
        let trader = self.trader(trader_id)?;
        let notional = to_decimal(notional)?;
        Ok(trader.exposure() + notional <= trader.max_exposure)
    }

    /// True iff a single order of this notional is within the trader's
    /// per-trade limit.
    pub fn within_per_trade_limit(&self, trader_id: &str, notional: f64) -> Result<bool> {
        let trader = self.trader(trader_id)?;
        let notional = to_decimal(notional)?;
        Ok(notional <= trader.max_per_trade_limit)
    }

    pub fn exposure(&self, trader_id: &str) -> Result<Decimal> {
        Ok(self.trader(trader_id)?.exposure())
    }
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn to_decimal(notional: f64) -> Result<Decimal> {
    Decimal::from_f64(notional).ok_or_else(|| Error::Trading(format!("bad notional: {}", notional)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_boundary() {
        let ledger = CreditLedger::with_default_traders();
        // Push T1 to 95% of its 20M exposure cap.
        ledger
            .trader("T1")
            .unwrap()
            .add_exposure(Decimal::from(19_000_000u64));

        // Exactly at the cap is admitted, one past it is not.
        assert!(ledger.can_admit("T1", 1_000_000.0).unwrap());
        assert!(!ledger.can_admit("T1", 1_000_001.0).unwrap());
    }

    #[test]
    fn test_unknown_trader() {
        let ledger = CreditLedger::with_default_traders();
        assert!(matches!(
            ledger.can_admit("T9", 1.0),
            Err(Error::UnknownTrader(_))
        ));
    }

    #[test]
    fn test_per_trade_limit() {
        let ledger = CreditLedger::with_default_traders();
        assert!(ledger.within_per_trade_limit("T1", 5_000_000.0).unwrap());
        assert!(!ledger.within_per_trade_limit("T1", 5_000_001.0).unwrap());
    }

    #[test]
    fn test_exposure_accumulates() {
        let ledger = CreditLedger::with_default_traders();
        let trader = ledger.trader("T2").unwrap();
        assert_eq!(trader.add_exposure(Decimal::from(100)), Decimal::from(100));
        assert_eq!(trader.add_exposure(Decimal::from(50)), Decimal::from(150));
        assert_eq!(ledger.exposure("T2").unwrap(), Decimal::from(150));
    }

    #[test]
    fn test_non_finite_notional_rejected() {
        let ledger = CreditLedger::with_default_traders();
        assert!(ledger.can_admit("T1", f64::NAN).is_err());
    }
}
