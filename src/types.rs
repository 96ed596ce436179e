use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A table as scraped from HTML: header texts plus text rows.
///
/// Rows added through `push_row` hold exactly `headers.len()` cells; the
/// cleaner treats cells missing from a hand-built ragged row as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row if its width matches the header count. Returns whether it was kept.
    pub fn push_row(&mut self, row: Vec<String>) -> bool {
        if row.len() != self.headers.len() {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// One fully-typed row of the films table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub rank: u32,
    pub peak: u32,
    pub title: String,
    pub worldwide_gross: f64,
    pub year: i32,
}

/// Films table after cleaning. No record carries a missing numeric value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub records: Vec<FilmRecord>,
}

impl CleanedTable {
    pub fn new(records: Vec<FilmRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ranks(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.rank as f64).collect()
    }

    pub fn peaks(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.peak as f64).collect()
    }
}

/// The three derived statistics of the films task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmMetrics {
    pub two_bn_before_2020: usize,
    pub earliest_1_5bn_film: String,
    pub rank_peak_correlation: f64,
}

/// Base64 data URI holding a rendered chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartArtifact(pub String);

impl ChartArtifact {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How required column keywords are matched against table headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMatchMode {
    /// Keyword appears anywhere in the lowercased header
    #[default]
    Substring,
    /// Keyword equals the lowercased header once footnotes are removed
    Exact,
}

/// Source of HTML documents for the table fetcher
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url` as text
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
