use crate::cleaner::normalize_column_name;
use crate::constants::WIKITABLE_SELECTOR;
use crate::error::{AnalystError, Result};
use crate::metrics::FetchMetrics;
use crate::types::{HeaderMatchMode, PageFetcher, RawTable};
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Column keyword groups a films table must carry. A group is satisfied when
/// any one of its keywords matches a header.
pub const REQUIRED_COLUMNS: [&[&str]; 5] = [
    &["rank"],
    &["peak"],
    &["title", "film"],
    &["gross", "worldwide gross"],
    &["year"],
];

/// `PageFetcher` backed by a reqwest client with a browser-like user agent
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let started = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                FetchMetrics::record_fetch_failure("network");
                return Err(AnalystError::Fetch(e.to_string()));
            }
        };

        if !response.status().is_success() {
            FetchMetrics::record_fetch_failure("status");
            return Err(AnalystError::Fetch(format!(
                "GET {} failed with status: {}",
                url,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            FetchMetrics::record_fetch_failure("body");
            AnalystError::Fetch(e.to_string())
        })?;

        let elapsed = started.elapsed().as_secs_f64();
        FetchMetrics::record_fetch_success(body.len(), elapsed);
        info!("Fetched {} bytes in {:.2}s", body.len(), elapsed);
        Ok(body)
    }
}

/// Fetches a page and pulls out the first wikitable carrying the films header signature
pub struct TableFetcher {
    pages: Arc<dyn PageFetcher>,
    mode: HeaderMatchMode,
}

impl TableFetcher {
    pub fn new(pages: Arc<dyn PageFetcher>, mode: HeaderMatchMode) -> Self {
        Self { pages, mode }
    }

    pub fn mode(&self) -> HeaderMatchMode {
        self.mode
    }

    #[instrument(skip(self))]
    pub async fn fetch_table(&self, url: &str) -> Result<RawTable> {
        let html = self.pages.fetch_page(url).await?;
        let table = extract_table(&html, self.mode)?;
        debug!("Scraped table columns: {:?}", table.headers);
        for row in table.rows.iter().take(5) {
            debug!("Sample row: {:?}", row);
        }
        Ok(table)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| AnalystError::NoTableFound(format!("invalid selector '{}': {}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// `td`/`th` children of a row, skipping cells of nested tables
fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

fn keyword_matches(header: &str, keyword: &str, mode: HeaderMatchMode) -> bool {
    match mode {
        HeaderMatchMode::Substring => header.to_lowercase().contains(keyword),
        HeaderMatchMode::Exact => normalize_column_name(header).to_lowercase() == keyword,
    }
}

/// True when every required keyword group matches at least one header
pub fn header_signature_matches(headers: &[String], mode: HeaderMatchMode) -> bool {
    REQUIRED_COLUMNS.iter().all(|group| {
        group
            .iter()
            .any(|kw| headers.iter().any(|h| keyword_matches(h, kw, mode)))
    })
}

/// Extract the first `wikitable` whose headers satisfy the films signature and
/// that yields at least one full-width data row.
pub fn extract_table(html: &str, mode: HeaderMatchMode) -> Result<RawTable> {
    let document = Html::parse_document(html);
    let table_selector = selector(WIKITABLE_SELECTOR)?;
    let row_selector = selector("tr")?;

    let tables: Vec<_> = document.select(&table_selector).collect();
    if tables.is_empty() {
        return Err(AnalystError::NoTableFound(
            "No wikitable found on the page".to_string(),
        ));
    }
    debug!("Found {} wikitable candidates", tables.len());

    for (index, table) in tables.iter().enumerate() {
        let mut rows = table.select(&row_selector);
        let Some(header_row) = rows.next() else {
            continue;
        };

        let headers: Vec<String> = row_cells(&header_row)
            .iter()
            .filter(|cell| cell.value().name() == "th")
            .map(cell_text)
            .collect();

        if headers.is_empty() || !header_signature_matches(&headers, mode) {
            continue;
        }

        let mut raw = RawTable::new(headers);
        let mut skipped = 0usize;
        for row in rows {
            let cells: Vec<String> = row_cells(&row).iter().map(cell_text).collect();
            if !raw.push_row(cells) {
                skipped += 1;
            }
        }

        if raw.is_empty() {
            warn!("Table #{} matched headers but had no usable rows", index);
            continue;
        }

        info!(
            "Selected table #{} with {} rows ({} rows skipped for width mismatch)",
            index,
            raw.len(),
            skipped
        );
        return Ok(raw);
    }

    Err(AnalystError::NoTableFound(
        "No suitable table found containing expected columns".to_string(),
    ))
}
