//! Trade Ledger
//! Append-only, ordered by timestamp; equal timestamps keep insertion order

use chrono::{DateTime, Duration, Utc};

use crate::engine::instrument::Symbol;
use crate::engine::trade::Trade;
use crate::error::{ExchangeError, Result};

#[derive(Debug, Default, Clone)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the ledger sorted. In-order arrivals append at the tail.
    pub fn insert(&mut self, trade: Trade) {
        let at = self
            .trades
            .partition_point(|t| t.timestamp() <= trade.timestamp());
        self.trades.insert(at, trade);
    }

    /// Trades strictly newer than `as_of - minutes_back`.
    ///
    /// The lower bound is open: a trade exactly at the cutoff is excluded.
    /// Nothing is filtered above `as_of`.
    pub fn windowed(&self, as_of: DateTime<Utc>, minutes_back: i64) -> Result<&[Trade]> {
        let cutoff = window_start(as_of, minutes_back)?;
        let start = self.trades.partition_point(|t| t.timestamp() <= cutoff);
        Ok(&self.trades[start..])
    }

    pub fn trades_for<'a>(&'a self, symbol: &'a Symbol) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.iter().filter(move |t| t.symbol() == symbol)
    }

    pub fn all(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

fn window_start(as_of: DateTime<Utc>, minutes_back: i64) -> Result<DateTime<Utc>> {
    if minutes_back <= 0 {
        return Err(ExchangeError::validation(format!(
            "window must be a positive number of minutes, got {minutes_back}"
        )));
    }

    Duration::try_minutes(minutes_back)
        .and_then(|span| as_of.checked_sub_signed(span))
        .ok_or_else(|| {
            ExchangeError::validation(format!("window of {minutes_back} minutes is out of range"))
        })
}
