//! Exchange Engine Module
//! Instrument registry, trade ledger and the metrics computed over them

pub mod exchange;
pub mod instrument;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod trade;

pub use exchange::Exchange;
pub use instrument::{DividendClass, DividendSpec, Instrument, Symbol, Ticker};
pub use ledger::TradeLedger;
pub use metrics::{PriceAccumulator, Precision};
pub use registry::InstrumentRegistry;
pub use report::{InstrumentReport, MarketReport, MetricValue};
pub use trade::{Side, Trade, TradeRequest};
