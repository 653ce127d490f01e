//! Trade executions supplied by callers
//! A Trade is an immutable fact once constructed

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::engine::instrument::Symbol;
use crate::error::{ExchangeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    id: Uuid,
    timestamp: DateTime<Utc>,
    symbol: Symbol,
    side: Side,
    quantity: u64,
    price: Decimal,
    #[serde(skip)]
    amount: Decimal,
}

impl Trade {
    pub fn new(
        timestamp: DateTime<Utc>,
        symbol: Symbol,
        side: Side,
        quantity: u64,
        price: Decimal,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(ExchangeError::validation(format!(
                "{symbol}: trade quantity must be positive"
            )));
        }
        if price <= Decimal::ZERO {
            return Err(ExchangeError::validation(format!(
                "{symbol}: trade price {price} must be positive"
            )));
        }
        let amount = Decimal::from(quantity).checked_mul(price).ok_or_else(|| {
            ExchangeError::validation(format!(
                "{symbol}: trade value {quantity} x {price} exceeds the decimal range"
            ))
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            timestamp,
            symbol,
            side,
            quantity,
            price,
            amount,
        })
    }

    /// Buy executed now
    pub fn buy(symbol: Symbol, quantity: u64, price: Decimal) -> Result<Self> {
        Self::new(Utc::now(), symbol, Side::Buy, quantity, price)
    }

    /// Sell executed now
    pub fn sell(symbol: Symbol, quantity: u64, price: Decimal) -> Result<Self> {
        Self::new(Utc::now(), symbol, Side::Sell, quantity, price)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// quantity * price, checked at construction
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Wire shape of a trade in replay files; validated through `Trade::new`
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub timestamp: DateTime<Utc>,
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: u64,
    pub price: Decimal,
}

impl TryFrom<TradeRequest> for Trade {
    type Error = ExchangeError;

    fn try_from(req: TradeRequest) -> Result<Self> {
        Trade::new(req.timestamp, req.symbol, req.side, req.quantity, req.price)
    }
}
