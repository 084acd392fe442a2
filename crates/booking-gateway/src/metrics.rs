//! Prometheus metrics for monitoring.

use booking_core::types::BookingClass;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Metrics registry for the prediction service
#[derive(Debug)]
pub struct MetricsRegistry {
    /// Prometheus registry
    registry: Registry,
    /// Successful predictions
    pub predictions_total: Counter,
    /// Predictions of class 0
    pub cancellations_total: Counter,
    /// Predictions of class 1
    pub completions_total: Counter,
    /// Requests rejected before a prediction was made
    pub rejected_total: Counter,
    /// End-to-end prediction latency histogram (nanoseconds)
    pub prediction_latency_ns: Histogram,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Create a new metrics registry
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let predictions_total = Counter::default();
        registry.register(
            "booking_predictions",
            "Total number of predictions served",
            predictions_total.clone(),
        );

        let cancellations_total = Counter::default();
        registry.register(
            "booking_predicted_cancellations",
            "Predictions of a cancelled booking",
            cancellations_total.clone(),
        );

        let completions_total = Counter::default();
        registry.register(
            "booking_predicted_completions",
            "Predictions of a completed booking",
            completions_total.clone(),
        );

        let rejected_total = Counter::default();
        registry.register(
            "booking_rejected",
            "Requests rejected during parsing or preprocessing",
            rejected_total.clone(),
        );

        // 1us to ~1s
        let prediction_latency_ns = Histogram::new(exponential_buckets(1_000.0, 2.0, 20));
        registry.register(
            "booking_prediction_latency_ns",
            "Prediction latency in nanoseconds",
            prediction_latency_ns.clone(),
        );

        Self {
            registry,
            predictions_total,
            cancellations_total,
            completions_total,
            rejected_total,
            prediction_latency_ns,
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, class: BookingClass, latency_ns: u64) {
        self.predictions_total.inc();
        match class {
            BookingClass::Canceled => self.cancellations_total.inc(),
            BookingClass::NotCanceled => self.completions_total.inc(),
        };
        self.prediction_latency_ns.observe(latency_ns as f64);
    }

    /// Record a rejected request
    pub fn record_rejection(&self) {
        self.rejected_total.inc();
    }

    /// Encode metrics for Prometheus scraping
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }

    /// Get registry reference
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
