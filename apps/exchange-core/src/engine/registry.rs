//! Instrument Registry
//! Maps each symbol to the Ticker it exclusively owns

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::engine::instrument::{DividendSpec, Instrument, Symbol, Ticker};
use crate::error::{ExchangeError, Result};

#[derive(Debug, Default, Clone)]
pub struct InstrumentRegistry {
    tickers: HashMap<Symbol, Ticker>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument; an existing entry is never replaced or merged
    pub fn register(&mut self, instrument: Instrument, spec: &DividendSpec) -> Result<&Ticker> {
        if self.tickers.contains_key(&instrument.symbol) {
            return Err(ExchangeError::DuplicateInstrument(instrument.symbol));
        }

        let ticker = Ticker::new(instrument, spec)?;
        let symbol = ticker.symbol().clone();
        Ok(self.tickers.entry(symbol).or_insert(ticker))
    }

    pub fn lookup(&self, symbol: &Symbol) -> Result<&Ticker> {
        self.tickers
            .get(symbol)
            .ok_or_else(|| ExchangeError::InstrumentNotFound(symbol.clone()))
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.tickers.contains_key(symbol)
    }

    pub fn set_last_price(&mut self, symbol: &Symbol, price: Decimal) -> Result<()> {
        self.tickers
            .get_mut(symbol)
            .ok_or_else(|| ExchangeError::InstrumentNotFound(symbol.clone()))?
            .set_price(price)
    }

    /// Registered instruments in symbol order
    pub fn instruments(&self) -> Vec<Instrument> {
        let mut instruments: Vec<Instrument> = self
            .tickers
            .values()
            .map(|t| t.instrument().clone())
            .collect();
        instruments.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        instruments
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}
