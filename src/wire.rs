//! Simplified FIX 4.4 wire encoding
//!
//! Renders trade snapshots as `tag=value|` strings. Real connectivity
//! would go through a FIX engine; this keeps just enough of the message
//! shapes for downstream assertions.

use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::types::{Side, Trade, TradeState};

pub const NEW_ORDER_SINGLE: &str = "D";
pub const EXECUTION_REPORT: &str = "8";

/// FIX 4.4 tag numbers used by the two message shapes.
pub mod tag {
    pub const AVG_PX: u32 = 6;
    pub const CL_ORD_ID: u32 = 11;
    pub const CUM_QTY: u32 = 14;
    pub const EXEC_ID: u32 = 17;
    pub const MSG_TYPE: u32 = 35;
    pub const ORDER_QTY: u32 = 38;
    pub const ORD_STATUS: u32 = 39;
    pub const ORD_TYPE: u32 = 40;
    pub const PRICE: u32 = 44;
    pub const SENDER_COMP_ID: u32 = 49;
    pub const SENDING_TIME: u32 = 52;
    pub const SIDE: u32 = 54;
    pub const SYMBOL: u32 = 55;
    pub const TARGET_COMP_ID: u32 = 56;
    pub const EXEC_TYPE: u32 = 150;
}

/// A single FIX message. The BTreeMap keeps fields in ascending tag order,
/// which is exactly the rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixMessage {
    fields: BTreeMap<u32, String>,
}

impl FixMessage {
    /// New message with MsgType and SendingTime stamped at build time.
    pub fn new(msg_type: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(tag::MSG_TYPE, msg_type.to_string());
        fields.insert(
            tag::SENDING_TIME,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        Self { fields }
    }

    pub fn field(mut self, tag: u32, value: impl fmt::Display) -> Self {
        self.fields.insert(tag, value.to_string());
        self
    }

    /// Prices render with two decimals.
    pub fn price_field(self, tag: u32, value: f64) -> Self {
        self.field(tag, format!("{:.2}", value))
    }

    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    /// `tag=value|` pairs, ascending tag order, trailing delimiter.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (tag, value) in &self.fields {
            out.push_str(&format!("{}={}|", tag, value));
        }
        out
    }
}

/// NewOrderSingle (35=D) for a trade snapshot.
pub fn new_order_single(trade: &Trade) -> FixMessage {
    FixMessage::new(NEW_ORDER_SINGLE)
        .field(tag::SENDER_COMP_ID, "CLIENT")
        .field(tag::TARGET_COMP_ID, "EXCHANGE")
        .field(tag::CL_ORD_ID, &trade.id)
        .field(tag::SYMBOL, &trade.isin)
        .field(tag::SIDE, side_code(trade.side))
        .field(tag::ORDER_QTY, trade.quantity)
        .field(tag::ORD_TYPE, "2") // limit
        .price_field(tag::PRICE, trade.limit_price)
}

/// ExecutionReport (35=8) reflecting whatever state the snapshot carries.
/// Callable at any lifecycle point, mid-execution included.
pub fn execution_report(trade: &Trade) -> FixMessage {
    let short_id: String = trade.id.chars().take(8).collect();
    FixMessage::new(EXECUTION_REPORT)
        .field(tag::SENDER_COMP_ID, "EXCHANGE")
        .field(tag::TARGET_COMP_ID, "CLIENT")
        .field(tag::CL_ORD_ID, &trade.id)
        .field(tag::EXEC_ID, format!("EXEC-{}", short_id))
        .field(tag::EXEC_TYPE, exec_type(trade.state))
        .field(tag::ORD_STATUS, ord_status(trade.state))
        .field(tag::SYMBOL, &trade.isin)
        .field(tag::SIDE, side_code(trade.side))
        .field(tag::CUM_QTY, trade.filled_quantity)
        .price_field(tag::AVG_PX, trade.executed_price)
}

fn side_code(side: Side) -> &'static str {
    match side {
        Side::Buy => "1",
        Side::Sell => "2",
    }
}

fn exec_type(state: TradeState) -> &'static str {
    match state {
        TradeState::Created => "0",
        TradeState::PartiallyFilled => "1",
        TradeState::Executed | TradeState::Confirmed => "F",
        TradeState::Cancelled => "4",
        TradeState::Rejected => "8",
        TradeState::Retry | TradeState::PendingConfirmation => "0",
    }
}

fn ord_status(state: TradeState) -> &'static str {
    match state {
        TradeState::Created => "0",
        TradeState::PartiallyFilled => "1",
        TradeState::Executed | TradeState::Confirmed => "2",
        TradeState::Cancelled => "4",
        TradeState::Rejected => "8",
        TradeState::Retry | TradeState::PendingConfirmation => "A",
    }
}
