//! Exchange facade over the registry and the ledger
//! One coarse lock keeps "update last price + append trade" atomic for readers

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::ExchangeConfig;
use crate::engine::instrument::{DividendSpec, Instrument, Symbol, Ticker};
use crate::engine::ledger::TradeLedger;
use crate::engine::metrics::{self, Precision};
use crate::engine::registry::InstrumentRegistry;
use crate::engine::report::{InstrumentReport, MarketReport, MetricValue};
use crate::engine::trade::Trade;
use crate::error::{ExchangeError, Result};
use crate::observability::metrics::get_metrics;

#[derive(Debug, Default)]
struct ExchangeState {
    registry: InstrumentRegistry,
    ledger: TradeLedger,
}

pub struct Exchange {
    state: RwLock<ExchangeState>,
    window_minutes: i64,
    precision: Precision,
    parallel_threshold: usize,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(&ExchangeConfig::default())
    }
}

impl Exchange {
    pub fn new(config: &ExchangeConfig) -> Self {
        Self {
            state: RwLock::new(ExchangeState::default()),
            window_minutes: config.window_minutes,
            precision: config.precision,
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Build an exchange and register every catalog entry, stopping at the first failure
    pub fn from_catalog(config: &ExchangeConfig, catalog: &Catalog) -> Result<Self> {
        let exchange = Self::new(config);
        for entry in &catalog.instruments {
            exchange.register_instrument(entry.instrument(), &entry.dividend)?;
        }
        Ok(exchange)
    }

    pub fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    // =====================================================
    // REGISTRATION / RECORDING
    // =====================================================

    #[instrument(skip(self, spec), fields(symbol = %instrument.symbol, class = %instrument.class))]
    pub fn register_instrument(&self, instrument: Instrument, spec: &DividendSpec) -> Result<()> {
        let mut state = self.state.write();

        match state.registry.register(instrument, spec) {
            Ok(ticker) => {
                info!(
                    last_dividend = %ticker.last_dividend(),
                    par_value = %ticker.par_value(),
                    "Instrument registered"
                );
            }
            Err(e) => {
                warn!(error = %e, "Instrument registration rejected");
                record_rejection("register", &e);
                return Err(e);
            }
        }

        if let Some(m) = get_metrics() {
            m.registered_instruments.set(state.registry.len() as f64);
        }
        Ok(())
    }

    /// Accept a trade: set the instrument's last price, then append to the ledger.
    ///
    /// An unregistered instrument is rejected before either effect happens.
    pub fn record_trade(&self, trade: Trade) -> Result<()> {
        let mut state = self.state.write();
        let state = &mut *state;

        if let Err(e) = state
            .registry
            .set_last_price(trade.symbol(), trade.price())
        {
            warn!(symbol = %trade.symbol(), error = %e, "Trade rejected");
            record_rejection("record_trade", &e);
            return Err(e);
        }

        debug!(
            trade_id = %trade.id(),
            symbol = %trade.symbol(),
            side = %trade.side(),
            quantity = trade.quantity(),
            price = %trade.price(),
            "Trade recorded"
        );

        if let Some(m) = get_metrics() {
            m.trades_recorded_total
                .with_label_values(&[trade.symbol().as_str(), trade.side().as_str()])
                .inc();
        }

        state.ledger.insert(trade);

        if let Some(m) = get_metrics() {
            m.ledger_trades.set(state.ledger.len() as f64);
        }
        Ok(())
    }

    // =====================================================
    // QUERIES
    // =====================================================

    /// Trades strictly newer than `as_of - minutes_back`
    pub fn windowed(&self, as_of: DateTime<Utc>, minutes_back: i64) -> Result<Vec<Trade>> {
        let state = self.state.read();
        Ok(state.ledger.windowed(as_of, minutes_back)?.to_vec())
    }

    pub fn ticker(&self, symbol: &Symbol) -> Result<Ticker> {
        self.state.read().registry.lookup(symbol).cloned()
    }

    pub fn instruments(&self) -> Vec<Instrument> {
        self.state.read().registry.instruments()
    }

    pub fn trades_for(&self, symbol: &Symbol) -> Result<Vec<Trade>> {
        let state = self.state.read();
        state.registry.lookup(symbol)?;
        Ok(state.ledger.trades_for(symbol).cloned().collect())
    }

    pub fn trade_count(&self) -> usize {
        self.state.read().ledger.len()
    }

    // =====================================================
    // METRICS
    // =====================================================

    /// Volume-weighted price over the default window ending at `as_of` (now if `None`)
    pub fn stock_price(&self, symbol: &Symbol, as_of: Option<DateTime<Utc>>) -> Result<Decimal> {
        self.stock_price_over(symbol, as_of.unwrap_or_else(Utc::now), self.window_minutes)
    }

    pub fn stock_price_over(
        &self,
        symbol: &Symbol,
        as_of: DateTime<Utc>,
        minutes_back: i64,
    ) -> Result<Decimal> {
        timed("stock_price", || {
            let state = self.state.read();
            state.registry.lookup(symbol)?;
            let window = state.ledger.windowed(as_of, minutes_back)?;
            let price = metrics::weighted_price(
                window,
                symbol,
                &self.precision,
                self.parallel_threshold,
            )?;
            debug!(symbol = %symbol, price = %price, window = window.len(), "Stock price computed");
            Ok(price)
        })
    }

    pub fn dividend_yield(&self, symbol: &Symbol) -> Result<Decimal> {
        timed("dividend_yield", || {
            let state = self.state.read();
            let value = state.registry.lookup(symbol)?.dividend_yield()?;
            Ok(self.precision.round_ratio(value))
        })
    }

    /// Dividend yield as a percentage
    pub fn dividend_yield_percent(&self, symbol: &Symbol) -> Result<Decimal> {
        timed("dividend_yield_percent", || {
            let state = self.state.read();
            let value = state.registry.lookup(symbol)?.dividend_yield()?;
            let percent = value.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(|| {
                ExchangeError::Overflow(format!("{symbol}: dividend yield {value} as a percentage"))
            })?;
            Ok(self.precision.round_ratio(percent))
        })
    }

    /// Ticker price over EPS.
    ///
    /// Fails with `EpsUnavailable` when EPS is not positive, and with
    /// `PriceUnavailable` when EPS is fine but no trade has set a price yet.
    pub fn price_earnings_ratio(&self, symbol: &Symbol) -> Result<Decimal> {
        timed("price_earnings_ratio", || {
            let state = self.state.read();
            let value = state.registry.lookup(symbol)?.price_earnings_ratio()?;
            Ok(self.precision.round_ratio(value))
        })
    }

    /// Geometric mean of weighted prices over the default window.
    ///
    /// Instruments without trades in the window, or whose price cannot be
    /// computed, are left out; if none qualify the index fails with
    /// `InsufficientData`.
    pub fn all_share_index(&self, as_of: Option<DateTime<Utc>>) -> Result<Decimal> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        timed("all_share_index", || {
            let state = self.state.read();
            self.index_of(&state, as_of)
        })
    }

    fn index_of(&self, state: &ExchangeState, as_of: DateTime<Utc>) -> Result<Decimal> {
        let window = state.ledger.windowed(as_of, self.window_minutes)?;

        let mut prices = Vec::new();
        for instrument in state.registry.instruments() {
            match metrics::weighted_price(
                window,
                &instrument.symbol,
                &self.precision,
                self.parallel_threshold,
            ) {
                Ok(price) if price > Decimal::ZERO => prices.push(price),
                Ok(price) => {
                    warn!(symbol = %instrument.symbol, price = %price, "Excluded from index, non-positive price");
                }
                Err(e) if e.is_insufficient_data() => {
                    debug!(symbol = %instrument.symbol, "Excluded from index, no trades in window");
                }
                Err(e) => {
                    warn!(symbol = %instrument.symbol, error = %e, "Excluded from index");
                }
            }
        }

        let index = metrics::geometric_mean(&prices).map_err(|e| {
            if e.is_insufficient_data() {
                ExchangeError::InsufficientData(format!(
                    "no instrument traded in the {} minutes before {as_of}",
                    self.window_minutes
                ))
            } else {
                e
            }
        })?;

        let index = self.precision.round_price(index);
        debug!(index = %index, constituents = prices.len(), "All-share index computed");
        Ok(index)
    }

    /// Snapshot every metric from a single consistent view of the state
    pub fn report(&self, as_of: Option<DateTime<Utc>>) -> Result<MarketReport> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        let state = self.state.read();
        let window = state.ledger.windowed(as_of, self.window_minutes)?;

        let mut instruments = Vec::new();
        for instrument in state.registry.instruments() {
            let ticker = state.registry.lookup(&instrument.symbol)?;
            let stock_price = metrics::weighted_price(
                window,
                &instrument.symbol,
                &self.precision,
                self.parallel_threshold,
            );

            let traded: Vec<&Trade> = window
                .iter()
                .filter(|t| t.symbol() == &instrument.symbol)
                .collect();

            instruments.push(InstrumentReport {
                symbol: instrument.symbol.clone(),
                class: instrument.class,
                trades_in_window: traded.len(),
                last_trade_price: traded.last().map(|t| t.price()),
                ticker_price: ticker.ticker_price(),
                stock_price: stock_price.into(),
                dividend_yield: ticker
                    .dividend_yield()
                    .map(|v| self.precision.round_ratio(v))
                    .into(),
                price_earnings_ratio: ticker
                    .price_earnings_ratio()
                    .map(|v| self.precision.round_ratio(v))
                    .into(),
            });
        }

        Ok(MarketReport {
            as_of,
            window_minutes: self.window_minutes,
            trades_in_window: window.len(),
            instruments,
            all_share_index: MetricValue::from(self.index_of(&state, as_of)),
        })
    }
}

fn record_rejection(operation: &str, error: &ExchangeError) {
    if let Some(m) = get_metrics() {
        m.operations_rejected_total
            .with_label_values(&[operation, error.reason()])
            .inc();
    }
}

fn timed<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    if let Some(m) = get_metrics() {
        m.metric_computation_duration
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
    }
    result
}
