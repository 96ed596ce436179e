//! Metrics for the analyst service
//!
//! Each phase (page fetching, analysis) owns a submodule with its metric
//! names and recording helpers. Names follow `analyst_{phase}_{name}`.

pub mod analysis;
pub mod fetch;
pub mod registry;

pub use analysis::AnalysisMetrics;
pub use fetch::FetchMetrics;

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Install the Prometheus exporter listening on `addr`.
///
/// Idempotent. Without a call to this, metric macros are no-ops.
pub fn init_metrics(addr: SocketAddr) {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => {
                info!("Prometheus HTTP exporter started at http://{}/metrics", addr);
                registry::register_all_metrics();
            }
            Err(e) => {
                warn!("Failed to install Prometheus exporter: {}", e);
            }
        }
    });
}

/// Implemented by each phase's metrics collection
pub trait PhaseMetrics {
    /// Pre-register every metric of the phase
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Build a metric name: analyst_{phase}_{metric_name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("analyst_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("analyst_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
