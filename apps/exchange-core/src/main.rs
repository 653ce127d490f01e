//! Exchange Core - market metrics report runner
//! Registers the catalog, replays a trade file and prints a metrics snapshot

use anyhow::Context;
use exchange_core::catalog::Catalog;
use exchange_core::config::ExchangeConfig;
use exchange_core::engine::{Exchange, Trade, TradeRequest};
use exchange_core::observability;
use exchange_core::observability::metrics::encode_metrics;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ExchangeConfig::from_env()?;

    observability::init_observability("exchange-core")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        window_minutes = config.window_minutes,
        "Starting Exchange Core..."
    );

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::sample()?,
    };
    info!(instruments = catalog.len(), "Catalog loaded");

    let exchange = Exchange::from_catalog(&config, &catalog)
        .context("failed to register instrument catalog")?;

    let mut latest = None;
    if let Some(path) = &config.trades_path {
        let (accepted, rejected) = replay_trades(&exchange, path, &mut latest)?;
        info!(accepted, rejected, "Trade file replayed");
    }

    // Anchor the window at the newest replayed trade so historical files still report
    let report = exchange.report(latest)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    debug!(metrics = %encode_metrics(), "Final metrics");
    info!("Exchange Core stopped");
    Ok(())
}

fn replay_trades(
    exchange: &Exchange,
    path: &Path,
    latest: &mut Option<chrono::DateTime<chrono::Utc>>,
) -> anyhow::Result<(usize, usize)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read trades {}", path.display()))?;
    let requests: Vec<TradeRequest> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid trade file {}", path.display()))?;

    let (mut accepted, mut rejected) = (0, 0);
    for request in requests {
        let outcome = Trade::try_from(request).and_then(|trade| {
            let ts = trade.timestamp();
            exchange.record_trade(trade).map(|()| ts)
        });

        match outcome {
            Ok(ts) => {
                accepted += 1;
                *latest = (*latest).max(Some(ts));
            }
            Err(e) => {
                rejected += 1;
                warn!(error = %e, "Skipping trade");
            }
        }
    }

    Ok((accepted, rejected))
}
