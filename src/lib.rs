pub mod chart;
pub mod cleaner;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod stats;
pub mod tasks;
pub mod types;
