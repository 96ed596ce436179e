use async_trait::async_trait;
use data_analyst_agent::config::Config;
use data_analyst_agent::error::{AnalystError, Result};
use data_analyst_agent::pipeline::Pipeline;
use data_analyst_agent::types::PageFetcher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const FILMS_HTML: &str = include_str!("../fixtures/highest_grossing_films.html");

/// Serves a fixed page body and counts how often it was asked for
pub struct StaticPages {
    body: Option<String>,
    pub calls: AtomicUsize,
}

impl StaticPages {
    pub fn new(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body
            .clone()
            .ok_or_else(|| AnalystError::Fetch(format!("GET {} failed with status: 503", url)))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.films.url = "http://fixture.local/films".to_string();
    config.chart.width = 400;
    config.chart.height = 300;
    config
}

pub fn pipeline_with(pages: Arc<StaticPages>) -> Pipeline {
    Pipeline::with_page_fetcher(pages, &test_config())
}
