//! Question handling and analysis metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct AnalysisMetrics;

impl AnalysisMetrics {
    /// Record a handled question. `task` is the detected task or "unknown",
    /// `outcome` is "ok" or an error kind.
    pub fn record_question(task: &'static str, outcome: &'static str, duration_secs: f64) {
        ::metrics::counter!(
            phase_metric!(counter, "analysis", "questions"),
            "task" => task,
            "outcome" => outcome
        )
        .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "analysis", "duration_seconds"))
            .record(duration_secs);
    }

    /// Record the result of cleaning a scraped table
    pub fn record_cleaning(rows_kept: usize, rows_dropped: usize) {
        ::metrics::counter!(phase_metric!(counter, "analysis", "rows_kept"))
            .increment(rows_kept as u64);
        ::metrics::counter!(phase_metric!(counter, "analysis", "rows_dropped"))
            .increment(rows_dropped as u64);
    }

    /// Record the size of an encoded chart
    pub fn record_chart(chars: usize) {
        ::metrics::histogram!(phase_metric!(histogram, "analysis", "chart_bytes")).record(chars as f64);
    }
}

impl PhaseMetrics for AnalysisMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "analysis", "questions"));
        let _ = counter!(phase_metric!(counter, "analysis", "rows_kept"));
        let _ = counter!(phase_metric!(counter, "analysis", "rows_dropped"));
        let _ = histogram!(phase_metric!(histogram, "analysis", "duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "analysis", "chart_bytes"));
    }

    fn phase_name() -> &'static str {
        "analysis"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "analysis", "questions"),
                metric_type: MetricType::Counter,
                help: "Total number of questions handled",
                labels: vec!["task", "outcome"],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "rows_kept"),
                metric_type: MetricType::Counter,
                help: "Rows surviving table cleaning",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "rows_dropped"),
                metric_type: MetricType::Counter,
                help: "Rows dropped during table cleaning for missing values",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "analysis", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time to answer a question in seconds",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "analysis", "chart_bytes"),
                metric_type: MetricType::Histogram,
                help: "Length of encoded chart data URIs",
                labels: vec![],
            },
        ]
    }
}
