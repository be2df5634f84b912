//! Counters for the exchange flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Flow metrics.
pub struct FlowMetrics {
    /// Amount inputs received.
    pub amounts_received: AtomicU64,
    /// Amounts accepted.
    pub amounts_accepted: AtomicU64,
    /// Inputs rejected as malformed.
    pub amounts_rejected_format: AtomicU64,
    /// Inputs rejected as below the pair minimum.
    pub amounts_rejected_minimum: AtomicU64,
    /// Minimum fetches that failed or returned nothing.
    pub minimum_unavailable: AtomicU64,
    /// Estimates quoted.
    pub estimates_quoted: AtomicU64,
    /// Estimates that failed.
    pub estimates_failed: AtomicU64,
    /// Messages dropped by the staleness guard.
    pub messages_stale: AtomicU64,
    /// Flows reset after a session invariant violation.
    pub flow_resets: AtomicU64,
}

impl FlowMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            amounts_received: AtomicU64::new(0),
            amounts_accepted: AtomicU64::new(0),
            amounts_rejected_format: AtomicU64::new(0),
            amounts_rejected_minimum: AtomicU64::new(0),
            minimum_unavailable: AtomicU64::new(0),
            estimates_quoted: AtomicU64::new(0),
            estimates_failed: AtomicU64::new(0),
            messages_stale: AtomicU64::new(0),
            flow_resets: AtomicU64::new(0),
        }
    }

    pub fn amount_received(&self) {
        self.amounts_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn amount_accepted(&self) {
        self.amounts_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn amount_rejected_format(&self) {
        self.amounts_rejected_format.fetch_add(1, Ordering::Relaxed);
    }

    pub fn amount_rejected_minimum(&self) {
        self.amounts_rejected_minimum.fetch_add(1, Ordering::Relaxed);
    }

    pub fn minimum_unavailable(&self) {
        self.minimum_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn estimate_quoted(&self) {
        self.estimates_quoted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn estimate_failed(&self) {
        self.estimates_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_stale(&self) {
        self.messages_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flow_reset(&self) {
        self.flow_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> FlowMetricsSnapshot {
        FlowMetricsSnapshot {
            amounts_received: self.amounts_received.load(Ordering::Relaxed),
            amounts_accepted: self.amounts_accepted.load(Ordering::Relaxed),
            amounts_rejected_format: self.amounts_rejected_format.load(Ordering::Relaxed),
            amounts_rejected_minimum: self.amounts_rejected_minimum.load(Ordering::Relaxed),
            minimum_unavailable: self.minimum_unavailable.load(Ordering::Relaxed),
            estimates_quoted: self.estimates_quoted.load(Ordering::Relaxed),
            estimates_failed: self.estimates_failed.load(Ordering::Relaxed),
            messages_stale: self.messages_stale.load(Ordering::Relaxed),
            flow_resets: self.flow_resets.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let counters = [
            ("amounts_received", "Amount inputs received", s.amounts_received),
            ("amounts_accepted", "Amounts accepted", s.amounts_accepted),
            ("amounts_rejected_format", "Malformed amount inputs", s.amounts_rejected_format),
            ("amounts_rejected_minimum", "Amounts below the pair minimum", s.amounts_rejected_minimum),
            ("minimum_unavailable", "Minimum lookups without a result", s.minimum_unavailable),
            ("estimates_quoted", "Estimates quoted", s.estimates_quoted),
            ("estimates_failed", "Estimates failed", s.estimates_failed),
            ("messages_stale", "Messages dropped as stale", s.messages_stale),
            ("flow_resets", "Flows reset after an invalid session", s.flow_resets),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP coinswap_{name} {help}\n# TYPE coinswap_{name} counter\ncoinswap_{name} {value}\n\n"
            ));
        }
        out
    }
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of flow metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMetricsSnapshot {
    pub amounts_received: u64,
    pub amounts_accepted: u64,
    pub amounts_rejected_format: u64,
    pub amounts_rejected_minimum: u64,
    pub minimum_unavailable: u64,
    pub estimates_quoted: u64,
    pub estimates_failed: u64,
    pub messages_stale: u64,
    pub flow_resets: u64,
}

/// Shared metrics instance.
pub type SharedFlowMetrics = Arc<FlowMetrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = FlowMetrics::new();

        metrics.amount_received();
        metrics.amount_received();
        metrics.amount_rejected_format();
        metrics.amount_accepted();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.amounts_received, 2);
        assert_eq!(snapshot.amounts_rejected_format, 1);
        assert_eq!(snapshot.amounts_accepted, 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = FlowMetrics::new();
        metrics.message_stale();

        let output = metrics.to_prometheus();
        assert!(output.contains("coinswap_messages_stale 1"));
        assert!(output.contains("# TYPE coinswap_flow_resets counter"));
    }
}
