//! Registration of every phase's metrics, with name-conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{info, warn};

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::fetch::FetchMetrics>(&mut all_metrics);
    register_phase_metrics::<super::analysis::AnalysisMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );

    if std::env::var("ANALYST_METRICS_DEBUG").is_ok() {
        log_metrics_summary(&all_metrics);
    }
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_docs = T::metrics_documentation();
    let phase_name = T::phase_name();

    info!(
        "Registering {} metrics for phase '{}'",
        phase_docs.len(),
        phase_name
    );

    for doc in phase_docs {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' registered twice (phase '{}')",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

/// One line per metric, grouped by phase and sorted by name
fn summary_lines(all_metrics: &HashMap<String, MetricDoc>) -> Vec<String> {
    let mut docs: Vec<&MetricDoc> = all_metrics.values().collect();
    docs.sort_by_key(|doc| (extract_phase_from_metric_name(doc.name), doc.name));

    docs.iter()
        .map(|doc| {
            let labels = if doc.labels.is_empty() {
                String::new()
            } else {
                format!(" [{}]", doc.labels.join(", "))
            };
            format!(
                "{}: {} ({:?}){}: {}",
                extract_phase_from_metric_name(doc.name),
                doc.name,
                doc.metric_type,
                labels,
                doc.help
            )
        })
        .collect()
}

fn log_metrics_summary(all_metrics: &HashMap<String, MetricDoc>) {
    info!("=== Metrics Registry Summary ===");
    for line in summary_lines(all_metrics) {
        info!("  - {}", line);
    }
    info!("=== End Metrics Summary ===");
}

/// Phase name embedded in a metric name, e.g. "analyst_fetch_requests_total" -> "fetch"
pub fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("analyst_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}
