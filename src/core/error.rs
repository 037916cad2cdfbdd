//! Error handling - zero-cost, hierarchical errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// tradesim error hierarchy
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Instrument not present in the reference data store
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Trader not registered with the credit ledger
    #[error("Unknown trader: {0}")]
    UnknownTrader(String),

    /// Lookup miss in the trade registry
    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    /// Trading errors (bad order parameters, duplicate ids, etc.)
    #[error("Trading error: {0}")]
    Trading(String),
}
