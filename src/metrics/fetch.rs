//! Page fetch metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct FetchMetrics;

impl FetchMetrics {
    /// Record a successful page fetch
    pub fn record_fetch_success(bytes: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "fetch", "requests")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "fetch", "duration_seconds"))
            .record(duration_secs);
        ::metrics::histogram!(phase_metric!(histogram, "fetch", "page_bytes")).record(bytes as f64);
    }

    /// Record a failed fetch; `reason` is one of network, status, body
    pub fn record_fetch_failure(reason: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "fetch", "requests")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "fetch", "failures"), "reason" => reason)
            .increment(1);
    }
}

impl PhaseMetrics for FetchMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "fetch", "requests"));
        let _ = counter!(phase_metric!(counter, "fetch", "failures"));
        let _ = histogram!(phase_metric!(histogram, "fetch", "duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "fetch", "page_bytes"));
    }

    fn phase_name() -> &'static str {
        "fetch"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "fetch", "requests"),
                metric_type: MetricType::Counter,
                help: "Total number of outbound page requests",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "fetch", "failures"),
                metric_type: MetricType::Counter,
                help: "Total number of failed page requests",
                labels: vec!["reason"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "fetch", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of successful page requests in seconds",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "fetch", "page_bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of fetched pages in bytes",
                labels: vec![],
            },
        ]
    }
}
