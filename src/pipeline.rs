use crate::chart::{ChartLabels, ChartRenderer};
use crate::cleaner::DataCleaner;
use crate::config::Config;
use crate::constants::{COL_PEAK, COL_RANK};
use crate::error::{AnalystError, Result};
use crate::fetcher::{HttpPageFetcher, TableFetcher};
use crate::metrics::AnalysisMetrics;
use crate::stats::StatisticsEngine;
use crate::tasks::{AnalysisResponse, AnalysisTask, CourtAnswer, FilmsAnswer};
use crate::types::{ChartArtifact, PageFetcher};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Answers questions by running the matching task end to end.
///
/// Holds no per-request state; one instance serves every request.
pub struct Pipeline {
    fetcher: TableFetcher,
    cleaner: DataCleaner,
    stats: StatisticsEngine,
    renderer: ChartRenderer,
    films_url: String,
    chart_budget: usize,
}

impl Pipeline {
    pub fn new(fetcher: TableFetcher, renderer: ChartRenderer, films_url: &str, chart_budget: usize) -> Self {
        Self {
            fetcher,
            cleaner: DataCleaner::new(),
            stats: StatisticsEngine::new(),
            renderer,
            films_url: films_url.to_string(),
            chart_budget,
        }
    }

    /// Build a pipeline that fetches pages over HTTP
    pub fn from_config(config: &Config) -> Result<Self> {
        let pages = HttpPageFetcher::new(&config.films.user_agent, config.films.fetch_timeout())?;
        Ok(Self::with_page_fetcher(Arc::new(pages), config))
    }

    /// Build a pipeline around any page source
    pub fn with_page_fetcher(pages: Arc<dyn PageFetcher>, config: &Config) -> Self {
        Self::new(
            TableFetcher::new(pages, config.films.header_match),
            ChartRenderer::new(config.chart.width, config.chart.height),
            &config.films.url,
            config.chart.soft_budget_chars,
        )
    }

    /// Detect the task in `question` and answer it
    pub async fn answer(&self, question: &str) -> Result<AnalysisResponse> {
        debug!("Received question text: {:?}", question);
        let started = Instant::now();

        let task = match AnalysisTask::detect(question) {
            Ok(task) => task,
            Err(e) => {
                AnalysisMetrics::record_question("unknown", e.kind(), started.elapsed().as_secs_f64());
                return Err(e);
            }
        };

        let result = self.run(task).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        AnalysisMetrics::record_question(task.name(), outcome, started.elapsed().as_secs_f64());
        result
    }

    pub async fn run(&self, task: AnalysisTask) -> Result<AnalysisResponse> {
        info!("Running task: {}", task.name());
        match task {
            AnalysisTask::HighestGrossingFilms => Ok(AnalysisResponse::Films(self.run_films().await?)),
            AnalysisTask::HighCourtJudgments => Ok(AnalysisResponse::Court(CourtAnswer::placeholder())),
        }
    }

    #[instrument(skip(self), fields(url = %self.films_url))]
    pub async fn run_films(&self) -> Result<FilmsAnswer> {
        let raw = self.fetcher.fetch_table(&self.films_url).await?;
        let cleaned = self.cleaner.clean(&raw)?;
        let metrics = self.stats.analyze(&cleaned);
        info!(
            "Films metrics: count={}, earliest={:?}, correlation={:.6}",
            metrics.two_bn_before_2020, metrics.earliest_1_5bn_film, metrics.rank_peak_correlation
        );

        let chart = self.render_chart(cleaned.ranks(), cleaned.peaks()).await?;
        Ok(FilmsAnswer::new(metrics, chart))
    }

    async fn render_chart(&self, ranks: Vec<f64>, peaks: Vec<f64>) -> Result<ChartArtifact> {
        let renderer = self.renderer;
        let labels = ChartLabels::new(COL_RANK, COL_PEAK, "Rank vs Peak");

        let chart = tokio::task::spawn_blocking(move || {
            renderer.render_scatter_with_regression(&ranks, &peaks, &labels)
        })
        .await
        .map_err(|e| AnalystError::Chart(format!("render task failed: {}", e)))??;

        AnalysisMetrics::record_chart(chart.len());
        if chart.len() > self.chart_budget {
            warn!(
                "Chart data URI is {} chars, over the {} char budget",
                chart.len(),
                self.chart_budget
            );
        }
        Ok(chart)
    }
}
