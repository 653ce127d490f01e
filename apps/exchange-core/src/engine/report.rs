//! Point-in-time market snapshot
//! Each metric is either a value or the reason it could not be computed

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::instrument::{DividendClass, Symbol};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricValue {
    Value { value: Decimal },
    Unavailable { reason: String },
}

impl MetricValue {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            MetricValue::Value { value } => Some(*value),
            MetricValue::Unavailable { .. } => None,
        }
    }
}

impl From<Result<Decimal>> for MetricValue {
    fn from(result: Result<Decimal>) -> Self {
        match result {
            Ok(value) => MetricValue::Value { value },
            Err(e) => MetricValue::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub symbol: Symbol,
    pub class: DividendClass,
    /// Trades for this instrument inside the window
    pub trades_in_window: usize,
    /// Price of the newest of those trades
    pub last_trade_price: Option<Decimal>,
    pub ticker_price: Option<Decimal>,
    pub stock_price: MetricValue,
    pub dividend_yield: MetricValue,
    pub price_earnings_ratio: MetricValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub as_of: DateTime<Utc>,
    pub window_minutes: i64,
    pub trades_in_window: usize,
    pub instruments: Vec<InstrumentReport>,
    pub all_share_index: MetricValue,
}
