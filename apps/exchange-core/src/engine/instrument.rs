//! Instruments and their per-instrument Ticker state
//! Dividend yield and P/E formulas live here because they read only the Ticker

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ExchangeError, Result};

// =====================================================
// SYMBOL
// =====================================================

/// Stable instrument identifier, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExchangeError::validation("symbol must not be empty"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
            return Err(ExchangeError::validation(format!(
                "symbol {trimmed:?} contains unsupported characters"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ExchangeError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

// =====================================================
// INSTRUMENT
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividendClass {
    Common,
    Preferred,
}

impl fmt::Display for DividendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DividendClass::Common => f.write_str("common"),
            DividendClass::Preferred => f.write_str("preferred"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub class: DividendClass,
}

impl Instrument {
    pub fn new(symbol: Symbol, class: DividendClass) -> Self {
        Self { symbol, class }
    }

    pub fn common(symbol: &str) -> Result<Self> {
        Ok(Self::new(Symbol::new(symbol)?, DividendClass::Common))
    }

    pub fn preferred(symbol: &str) -> Result<Self> {
        Ok(Self::new(Symbol::new(symbol)?, DividendClass::Preferred))
    }
}

/// Dividend and par figures supplied at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendSpec {
    pub last_dividend: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_dividend: Option<Decimal>,
    pub par_value: Decimal,
}

impl DividendSpec {
    pub fn common(last_dividend: Decimal, par_value: Decimal) -> Self {
        Self {
            last_dividend,
            fixed_dividend: None,
            par_value,
        }
    }

    pub fn preferred(last_dividend: Decimal, fixed_dividend: Decimal, par_value: Decimal) -> Self {
        Self {
            last_dividend,
            fixed_dividend: Some(fixed_dividend),
            par_value,
        }
    }
}

// =====================================================
// TICKER
// =====================================================

/// Mutable market/dividend state owned by one registry entry.
///
/// `fixed_dividend` is `Some` iff the instrument is preferred, and
/// `ticker_price` stays `None` until the first trade is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticker {
    instrument: Instrument,
    last_dividend: Decimal,
    fixed_dividend: Option<Decimal>,
    par_value: Decimal,
    dividend: Decimal,
    ticker_price: Option<Decimal>,
}

impl Ticker {
    pub fn new(instrument: Instrument, spec: &DividendSpec) -> Result<Self> {
        let symbol = &instrument.symbol;

        if spec.last_dividend < Decimal::ZERO {
            return Err(ExchangeError::validation(format!(
                "{symbol}: last dividend {} is negative",
                spec.last_dividend
            )));
        }
        if spec.par_value <= Decimal::ZERO {
            return Err(ExchangeError::validation(format!(
                "{symbol}: par value {} must be positive",
                spec.par_value
            )));
        }

        let fixed_dividend = match (instrument.class, spec.fixed_dividend) {
            (DividendClass::Preferred, Some(fixed)) if fixed > Decimal::ZERO => Some(fixed),
            (DividendClass::Preferred, Some(fixed)) => {
                return Err(ExchangeError::validation(format!(
                    "{symbol}: fixed dividend {fixed} must be positive"
                )));
            }
            (DividendClass::Preferred, None) => {
                return Err(ExchangeError::validation(format!(
                    "{symbol}: preferred instruments require a fixed dividend"
                )));
            }
            (DividendClass::Common, Some(_)) => {
                return Err(ExchangeError::validation(format!(
                    "{symbol}: common instruments do not carry a fixed dividend"
                )));
            }
            (DividendClass::Common, None) => None,
        };

        let dividend = match fixed_dividend {
            Some(fixed) => fixed.checked_mul(spec.par_value).ok_or_else(|| {
                ExchangeError::validation(format!(
                    "{symbol}: fixed dividend {fixed} x par {} exceeds the decimal range",
                    spec.par_value
                ))
            })?,
            None => spec.last_dividend,
        };

        Ok(Self {
            instrument,
            last_dividend: spec.last_dividend,
            fixed_dividend,
            par_value: spec.par_value,
            dividend,
            ticker_price: None,
        })
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn symbol(&self) -> &Symbol {
        &self.instrument.symbol
    }

    pub fn class(&self) -> DividendClass {
        self.instrument.class
    }

    pub fn last_dividend(&self) -> Decimal {
        self.last_dividend
    }

    pub fn fixed_dividend(&self) -> Option<Decimal> {
        self.fixed_dividend
    }

    pub fn par_value(&self) -> Decimal {
        self.par_value
    }

    pub fn ticker_price(&self) -> Option<Decimal> {
        self.ticker_price
    }

    pub(crate) fn set_price(&mut self, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(ExchangeError::validation(format!(
                "{}: price {price} must be positive",
                self.symbol()
            )));
        }
        self.ticker_price = Some(price);
        Ok(())
    }

    /// Dividend amount per share for the instrument's class:
    /// `fixed_dividend * par_value` for preferred, `last_dividend` for common
    pub fn dividend(&self) -> Decimal {
        self.dividend
    }

    /// Earnings per share, approximated by the last dividend
    pub fn eps(&self) -> Decimal {
        self.last_dividend
    }

    fn traded_price(&self) -> Result<Decimal> {
        self.ticker_price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| ExchangeError::PriceUnavailable(self.symbol().clone()))
    }

    /// Unrounded dividend yield against the last traded price
    pub fn dividend_yield(&self) -> Result<Decimal> {
        let price = self.traded_price()?;
        self.dividend()
            .checked_div(price)
            .ok_or_else(|| ExchangeError::PriceUnavailable(self.symbol().clone()))
    }

    /// Unrounded price/earnings ratio; EPS is checked before the price
    pub fn price_earnings_ratio(&self) -> Result<Decimal> {
        let eps = self.eps();
        if eps <= Decimal::ZERO {
            return Err(ExchangeError::EpsUnavailable(self.symbol().clone()));
        }
        let price = self.traded_price()?;
        price
            .checked_div(eps)
            .ok_or_else(|| ExchangeError::EpsUnavailable(self.symbol().clone()))
    }
}
