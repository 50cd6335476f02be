/// Fire-and-forget counters the core reports into on every lookup and
/// every inbound RPC. The collector that samples these into a CSV (or
/// any other sink) lives outside the core; this crate only needs the
/// two call sites to exist.
pub trait MetricsSink: Send + Sync {
    fn record_lookup(&self, latency_ms: f64);
    fn increment_messages(&self);
}

/// Default sink used when no external collector is wired up: routes
/// both counters through `tracing` so they still show up in node logs.
#[derive(Debug, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn record_lookup(&self, latency_ms: f64) {
        tracing::debug!(latency_ms, "lookup completed");
    }

    fn increment_messages(&self) {
        tracing::trace!("message handled");
    }
}
