//! Error taxonomy for the exchange engine
//! Every failure is reported to the caller as a typed value; none are fatal

use thiserror::Error;

use crate::engine::instrument::Symbol;

pub type Result<T> = std::result::Result<T, ExchangeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Malformed input, rejected before any state mutation
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Instrument {0} is already registered")]
    DuplicateInstrument(Symbol),

    #[error("Instrument {0} is not registered")]
    InstrumentNotFound(Symbol),

    /// No qualifying trades; recoverable, never a zero price
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No traded price available for {0}")]
    PriceUnavailable(Symbol),

    #[error("EPS for {0} is not positive")]
    EpsUnavailable(Symbol),

    /// Arithmetic left the `Decimal` range
    #[error("Overflow: {0}")]
    Overflow(String),
}

impl ExchangeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }

    /// Short label used as the `reason` dimension on rejection metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DuplicateInstrument(_) => "duplicate_instrument",
            Self::InstrumentNotFound(_) => "instrument_not_found",
            Self::InsufficientData(_) => "insufficient_data",
            Self::PriceUnavailable(_) => "price_unavailable",
            Self::EpsUnavailable(_) => "eps_unavailable",
            Self::Overflow(_) => "overflow",
        }
    }
}
