//! Service Metrics
//!
//! Request and validation-failure counters, kept in a registry owned by the
//! service and rendered in the Prometheus text exposition format.

use crate::error::{Error, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters for the service use cases
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    requests: IntCounterVec,
    validation_failures: IntCounterVec,
    skus_projected: IntCounter,
}

impl ServiceMetrics {
    /// Create and register all counters
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("amlfs_requests_total", "Requests handled, by operation"),
            &["operation"],
        )
        .map_err(metrics_error)?;
        let validation_failures = IntCounterVec::new(
            Opts::new(
                "amlfs_validation_failures_total",
                "Requests rejected before reaching the backend, by error kind",
            ),
            &["kind"],
        )
        .map_err(metrics_error)?;
        let skus_projected = IntCounter::new(
            "amlfs_skus_projected_total",
            "SKU capability records returned by catalog projection",
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(requests.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(validation_failures.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(skus_projected.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            requests,
            validation_failures,
            skus_projected,
        })
    }

    #[inline]
    pub fn record_request(&self, operation: &str) {
        self.requests.with_label_values(&[operation]).inc();
    }

    /// Count a failure if it was caused by the caller's input
    pub fn record_failure(&self, err: &Error) {
        if err.is_validation() {
            let kind = err.kind().to_string();
            self.validation_failures
                .with_label_values(&[kind.as_str()])
                .inc();
        }
    }

    #[inline]
    pub fn record_projected(&self, count: usize) {
        self.skus_projected.inc_by(count as u64);
    }

    pub fn requests(&self, operation: &str) -> u64 {
        self.requests.with_label_values(&[operation]).get()
    }

    pub fn validation_failures(&self, kind: &str) -> u64 {
        self.validation_failures.with_label_values(&[kind]).get()
    }

    pub fn skus_projected(&self) -> u64 {
        self.skus_projected.get()
    }

    /// Render all counters in the text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| Error::Internal(format!("Metrics encoding: {}", e)))
    }
}

impl std::fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMetrics")
            .field("skus_projected", &self.skus_projected.get())
            .finish_non_exhaustive()
    }
}

fn metrics_error(e: prometheus::Error) -> Error {
    Error::Internal(format!("Metrics error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ServiceMetrics::new().unwrap();

        metrics.record_request("create");
        metrics.record_request("create");
        metrics.record_failure(&Error::EmptyUpdatePatch);
        metrics.record_failure(&Error::Internal("not counted".into()));
        metrics.record_projected(12);

        assert_eq!(metrics.requests("create"), 2);
        assert_eq!(metrics.requests("update"), 0);
        assert_eq!(metrics.validation_failures("empty_update_patch"), 1);
        assert_eq!(metrics.validation_failures("internal_error"), 0);
        assert_eq!(metrics.skus_projected(), 12);
    }

    #[test]
    fn test_render_text_format() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_request("sku_info");

        let text = metrics.render().unwrap();
        assert!(text.contains("amlfs_requests_total{operation=\"sku_info\"} 1"));
        assert!(text.contains("amlfs_skus_projected_total 0"));
    }
}
