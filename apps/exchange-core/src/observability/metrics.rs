//! Prometheus Metrics for the Exchange Engine
//! Trade intake, rejections, ledger size and metric computation latency

use once_cell::sync::{Lazy, OnceCell};
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Application metrics
pub struct Metrics {
    pub trades_recorded_total: CounterVec,
    pub operations_rejected_total: CounterVec,
    pub registered_instruments: Gauge,
    pub ledger_trades: Gauge,
    pub metric_computation_duration: HistogramVec,
}

static METRICS: OnceCell<Metrics> = OnceCell::new();

/// Initialize metrics. Repeated calls keep the first registration.
pub fn init_metrics(service_name: &str) -> anyhow::Result<()> {
    METRICS.get_or_try_init(|| build_metrics(service_name))?;
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

fn build_metrics(service_name: &str) -> anyhow::Result<Metrics> {
    let trades_recorded_total = CounterVec::new(
        Opts::new("trades_recorded_total", "Total trades accepted into the ledger")
            .namespace("exchange")
            .const_label("service", service_name),
        &["symbol", "side"],
    )?;

    let operations_rejected_total = CounterVec::new(
        Opts::new("operations_rejected_total", "Registrations and trades rejected")
            .namespace("exchange")
            .const_label("service", service_name),
        &["operation", "reason"],
    )?;

    let registered_instruments = Gauge::with_opts(
        Opts::new("registered_instruments", "Number of registered instruments")
            .namespace("exchange")
            .const_label("service", service_name),
    )?;

    let ledger_trades = Gauge::with_opts(
        Opts::new("ledger_trades", "Number of trades held in the ledger")
            .namespace("exchange")
            .const_label("service", service_name),
    )?;

    let metric_computation_duration = HistogramVec::new(
        HistogramOpts::new(
            "metric_computation_duration_seconds",
            "Metric computation latency in seconds",
        )
        .namespace("exchange")
        .const_label("service", service_name)
        .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["operation"],
    )?;

    REGISTRY.register(Box::new(trades_recorded_total.clone()))?;
    REGISTRY.register(Box::new(operations_rejected_total.clone()))?;
    REGISTRY.register(Box::new(registered_instruments.clone()))?;
    REGISTRY.register(Box::new(ledger_trades.clone()))?;
    REGISTRY.register(Box::new(metric_computation_duration.clone()))?;

    Ok(Metrics {
        trades_recorded_total,
        operations_rejected_total,
        registered_instruments,
        ledger_trades,
        metric_computation_duration,
    })
}

/// Get metrics instance, if initialized
pub fn get_metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

/// Encode metrics to Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}
