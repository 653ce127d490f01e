//! Metric computations over a window of trades
//! Volume-weighted price, geometric mean index, rounding policy

use rayon::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::engine::instrument::Symbol;
use crate::engine::trade::Trade;
use crate::error::{ExchangeError, Result};

// =====================================================
// PRECISION
// =====================================================

/// Fixed rounding applied to every reported metric (half-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Decimal places for weighted prices and the all-share index
    pub price_scale: u32,
    /// Decimal places for dividend yields and P/E ratios
    pub ratio_scale: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            price_scale: 2,
            ratio_scale: 6,
        }
    }
}

impl Precision {
    pub fn round_price(&self, value: Decimal) -> Decimal {
        round_half_up(value, self.price_scale)
    }

    /// Rounds to the price scale, or finer when the traded prices carry a finer tick
    pub fn round_price_to_tick(&self, value: Decimal, tick_scale: u32) -> Decimal {
        round_half_up(value, self.price_scale.max(tick_scale))
    }

    pub fn round_ratio(&self, value: Decimal) -> Decimal {
        round_half_up(value, self.ratio_scale)
    }
}

/// Half-up rounding that never collapses a non-zero value to zero.
///
/// Values smaller than half a unit at `scale` keep `scale` significant digits instead.
fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() && !value.is_zero() {
        return value
            .round_sf_with_strategy(scale.max(1), RoundingStrategy::MidpointAwayFromZero)
            .unwrap_or(value)
            .normalize();
    }
    rounded.normalize()
}

// =====================================================
// PRICE ACCUMULATOR
// =====================================================

/// Running `Σ(quantity·price)` and `Σ(quantity)`, plus the finest price tick seen.
///
/// Partial accumulators combine by summing both totals, so any split of
/// the window folds to the same result. Sums are checked and fail with
/// `Overflow` instead of wrapping or panicking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceAccumulator {
    total_amount: Decimal,
    total_quantity: Decimal,
    tick_scale: u32,
}

impl PriceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every trade in `trades`, stopping at the first overflow
    pub fn try_from_trades<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Result<Self> {
        trades.into_iter().try_fold(Self::new(), Self::with)
    }

    pub fn push(&mut self, trade: &Trade) -> Result<()> {
        let total_amount = checked_sum(self.total_amount, trade.amount(), "amount")?;
        let total_quantity =
            checked_sum(self.total_quantity, Decimal::from(trade.quantity()), "quantity")?;

        self.total_amount = total_amount;
        self.total_quantity = total_quantity;
        self.tick_scale = self.tick_scale.max(trade.price().scale());
        Ok(())
    }

    pub fn with(mut self, trade: &Trade) -> Result<Self> {
        self.push(trade)?;
        Ok(self)
    }

    pub fn merge(self, other: Self) -> Result<Self> {
        Ok(Self {
            total_amount: checked_sum(self.total_amount, other.total_amount, "amount")?,
            total_quantity: checked_sum(self.total_quantity, other.total_quantity, "quantity")?,
            tick_scale: self.tick_scale.max(other.tick_scale),
        })
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }

    /// Largest number of decimal places among the accumulated prices
    pub fn tick_scale(&self) -> u32 {
        self.tick_scale
    }

    /// `None` when nothing was accumulated
    pub fn weighted_price(&self) -> Option<Decimal> {
        if self.total_quantity.is_zero() {
            return None;
        }
        self.total_amount.checked_div(self.total_quantity)
    }
}

fn checked_sum(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| ExchangeError::Overflow(format!("total {what} exceeds the decimal range")))
}

// =====================================================
// WEIGHTED PRICE
// =====================================================

/// Sequential single-pass fold over one symbol's trades
pub fn accumulate(trades: &[Trade], symbol: &Symbol) -> Result<PriceAccumulator> {
    PriceAccumulator::try_from_trades(trades.iter().filter(|t| t.symbol() == symbol))
}

/// Same totals as [`accumulate`], computed as rayon partial folds
pub fn accumulate_parallel(trades: &[Trade], symbol: &Symbol) -> Result<PriceAccumulator> {
    trades
        .par_iter()
        .filter(|t| t.symbol() == symbol)
        .try_fold(PriceAccumulator::new, PriceAccumulator::with)
        .try_reduce(PriceAccumulator::new, PriceAccumulator::merge)
}

/// Volume-weighted price of `symbol` over `trades`.
///
/// Rounded half-up to the price scale, or to the finest tick among the
/// traded prices when that is finer, so a lone trade prices exactly and the
/// result stays strictly positive. Windows with at least
/// `parallel_threshold` trades aggregate in parallel.
pub fn weighted_price(
    trades: &[Trade],
    symbol: &Symbol,
    precision: &Precision,
    parallel_threshold: usize,
) -> Result<Decimal> {
    let acc = if trades.len() >= parallel_threshold {
        accumulate_parallel(trades, symbol)?
    } else {
        accumulate(trades, symbol)?
    };

    acc.weighted_price()
        .map(|p| precision.round_price_to_tick(p, acc.tick_scale()))
        .ok_or_else(|| {
            ExchangeError::InsufficientData(format!("no trades for {symbol} in the window"))
        })
}

// =====================================================
// GEOMETRIC MEAN
// =====================================================

/// `(Π p_i)^(1/n)` computed as `exp(Σ ln p_i / n)`; unrounded.
///
/// An empty input has no geometric mean and fails with `InsufficientData`.
pub fn geometric_mean(values: &[Decimal]) -> Result<Decimal> {
    match values {
        [] => Err(ExchangeError::InsufficientData(
            "no prices to average".to_string(),
        )),
        [single] if *single > Decimal::ZERO => Ok(*single),
        _ => {
            let mut log_sum = Decimal::ZERO;
            for value in values {
                let ln = value.checked_ln().ok_or_else(|| {
                    ExchangeError::validation(format!(
                        "geometric mean requires positive values, got {value}"
                    ))
                })?;
                log_sum += ln;
            }

            let n = Decimal::from(values.len());
            (log_sum / n)
                .checked_exp()
                .ok_or_else(|| ExchangeError::Overflow("geometric mean out of range".to_string()))
        }
    }
}
