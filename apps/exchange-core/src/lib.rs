//! Exchange Core - trade ledger and market metrics for a minimal stock exchange
//!
//! Instruments are registered from a caller-supplied catalog, trades are
//! recorded as immutable facts, and metrics (volume-weighted price, dividend
//! yield, P/E ratio, all-share index) are derived from a trailing window of
//! the ledger.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;

pub use catalog::{Catalog, CatalogEntry};
pub use config::ExchangeConfig;
pub use engine::{
    DividendClass, DividendSpec, Exchange, Instrument, Side, Symbol, Ticker, Trade,
};
pub use error::{ExchangeError, Result};
