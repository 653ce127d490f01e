//! Configuration Module
//! Loads settings from environment variables

use anyhow::bail;
use std::env;
use std::path::PathBuf;

use crate::engine::metrics::Precision;

pub const DEFAULT_WINDOW_MINUTES: i64 = 15;
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Trailing window for market metrics, in minutes
    pub window_minutes: i64,
    pub precision: Precision,
    /// Window size at which weighted prices aggregate in parallel
    pub parallel_threshold: usize,
    pub catalog_path: Option<PathBuf>,
    pub trades_path: Option<PathBuf>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_WINDOW_MINUTES,
            precision: Precision::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            catalog_path: None,
            trades_path: None,
        }
    }
}

impl ExchangeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let window_minutes = env::var("EXCHANGE_WINDOW_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.window_minutes);
        if window_minutes <= 0 {
            bail!("EXCHANGE_WINDOW_MINUTES must be positive, got {window_minutes}");
        }

        Ok(Self {
            window_minutes,
            precision: Precision {
                price_scale: env::var("EXCHANGE_PRICE_SCALE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.precision.price_scale),
                ratio_scale: env::var("EXCHANGE_RATIO_SCALE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.precision.ratio_scale),
            },
            parallel_threshold: env::var("EXCHANGE_PARALLEL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.parallel_threshold),
            catalog_path: env::var_os("EXCHANGE_CATALOG").map(PathBuf::from),
            trades_path: env::var_os("EXCHANGE_TRADES").map(PathBuf::from),
        })
    }
}
