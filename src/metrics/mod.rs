//! In-memory metrics collection, exposed in Prometheus text format at `/metrics`.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Duration;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

#[derive(Debug, Clone)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set(&self, value: f64) {
        self.value.store(value as u64, Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed) as f64
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration histogram tracked as running count and sum, Prometheus-style.
#[derive(Debug, Clone)]
pub struct Histogram {
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            sum_micros: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn observe(&self, duration: Duration) {
        self.sum_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum_seconds(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
            gauges: DashMap::new(),
            histograms: DashMap::new(),
        }
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, counter.get()));
        }

        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            output.push_str(&format!("# TYPE {} gauge\n", name));
            output.push_str(&format!("{} {}\n", name, gauge.get()));
        }

        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            output.push_str(&format!("# TYPE {} histogram\n", name));
            output.push_str(&format!("{}_count {}\n", name, histogram.get_count()));
            output.push_str(&format!("{}_sum {}\n", name, histogram.get_sum_seconds()));
        }

        Ok(output)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics registry
pub static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Application metrics for the board service
pub struct BoardMetrics {
    pub requests_total: Counter,
    pub request_duration: Histogram,
    pub allocation_plans_total: Counter,
    pub maintenance_purged_total: Counter,
    pub salesmix_uploads_total: Counter,
    pub auth_failures_total: Counter,
    pub app_start_timestamp: Gauge,
}

impl BoardMetrics {
    fn new() -> Self {
        Self {
            requests_total: METRICS.get_or_create_counter("http_requests_total"),
            request_duration: METRICS.get_or_create_histogram("http_request_duration_seconds"),
            allocation_plans_total: METRICS.get_or_create_counter("allocation_plans_total"),
            maintenance_purged_total: METRICS.get_or_create_counter("maintenance_purged_total"),
            salesmix_uploads_total: METRICS.get_or_create_counter("salesmix_uploads_total"),
            auth_failures_total: METRICS.get_or_create_counter("auth_failures_total"),
            app_start_timestamp: METRICS.get_or_create_gauge("app_start_timestamp_seconds"),
        }
    }

    pub fn record_request(&self, duration: Duration) {
        self.requests_total.inc();
        self.request_duration.observe(duration);
    }

    pub fn mark_started(&self) {
        self.app_start_timestamp
            .set(chrono::Utc::now().timestamp() as f64);
    }
}

pub static BOARD_METRICS: Lazy<BoardMetrics> = Lazy::new(BoardMetrics::new);

/// HTTP handler body for `/metrics`
pub fn render_metrics() -> Result<String, MetricsError> {
    METRICS.export_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let registry = MetricsRegistry::new();
        let c = registry.get_or_create_counter("test_total");
        c.inc();
        c.inc_by(4);
        assert_eq!(registry.get_or_create_counter("test_total").get(), 5);
    }

    #[test]
    fn export_contains_type_lines() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("widgets_total").inc();
        registry.get_or_create_gauge("depth").set(3.0);

        let text = registry.export_metrics().unwrap();
        assert!(text.contains("# TYPE widgets_total counter"));
        assert!(text.contains("widgets_total 1"));
        assert!(text.contains("# TYPE depth gauge"));
    }

    #[test]
    fn histogram_tracks_count_and_sum() {
        let registry = MetricsRegistry::new();
        let h = registry.get_or_create_histogram("latency_seconds");
        h.observe(Duration::from_millis(250));
        h.observe(Duration::from_millis(750));
        assert_eq!(h.get_count(), 2);
        assert!((h.get_sum_seconds() - 1.0).abs() < 1e-6);
    }
}
