//! tradesim - Trade lifecycle simulation engine
//! Order state machine, synthetic market data, bounded-retry execution

// Public modules
pub mod core;
pub mod credit;
pub mod engine;
pub mod feed;
pub mod instruments;
pub mod registry;
pub mod wire;

// Re-exports
pub use crate::core::types::{Instrument, Side, Trade, TradeMetrics, TradeState};
pub use crate::core::{Config, Error, Result};
pub use crate::credit::{CreditLedger, Trader};
pub use crate::engine::ExecutionEngine;
pub use crate::feed::PriceFeed;
pub use crate::instruments::InstrumentStore;
pub use crate::registry::TradeRegistry;
