use crate::constants::{COL_GROSS, COL_PEAK, COL_RANK, COL_TITLE, COL_YEAR};
use crate::error::{AnalystError, Result};
use crate::metrics::AnalysisMetrics;
use crate::types::{CleanedTable, FilmRecord, RawTable};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static FOOTNOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Canonical column name and the lowercase keywords that identify it,
/// most specific first.
const COLUMN_KEYWORDS: [(&str, &[&str]); 5] = [
    (COL_RANK, &["rank"]),
    (COL_PEAK, &["peak"]),
    (COL_TITLE, &["title", "film"]),
    (COL_GROSS, &["worldwide gross", "gross"]),
    (COL_YEAR, &["year"]),
];

/// Remove `[..]` annotations, turn line breaks into spaces and trim
pub fn strip_footnotes(text: &str) -> String {
    FOOTNOTE_RE
        .replace_all(text, "")
        .replace("\r\n", " ")
        .replace(&['\n', '\r'][..], " ")
        .trim()
        .to_string()
}

/// Column header with everything from the first `[` onwards removed
pub fn normalize_column_name(name: &str) -> String {
    name.split('[').next().unwrap_or_default().trim().to_string()
}

/// First run of four digits, e.g. `"2019[a]"` -> 2019
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// First run of digits, used for Rank and Peak cells like `"4TS3"`
pub fn extract_integer(text: &str) -> Option<u32> {
    DIGITS_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Parse a currency string such as `"$2.5 billion"` or `"$2,923,706,026"`.
///
/// Returns `None` for empty or unparseable input so callers can tell a
/// missing gross apart from a real zero.
pub fn parse_currency(text: &str) -> Option<f64> {
    let mut value = text.replace(&['$', ','][..], "").to_lowercase().trim().to_string();
    if value.is_empty() {
        return None;
    }

    let mut multiplier = 1.0;
    if value.contains("billion") {
        multiplier = 1_000_000_000.0;
        value = value.replace("billion", "").trim().to_string();
    } else if value.contains("million") {
        multiplier = 1_000_000.0;
        value = value.replace("million", "").trim().to_string();
    }

    let amount: f64 = value.parse().ok()?;
    let amount = amount * multiplier;
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// Index of each canonical column within a header row, after name normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    rank: usize,
    peak: usize,
    title: usize,
    gross: usize,
    year: usize,
}

fn find_column(normalized: &[String], keywords: &[&str]) -> Option<usize> {
    keywords
        .iter()
        .find_map(|kw| normalized.iter().position(|h| h == kw))
        .or_else(|| {
            keywords
                .iter()
                .find_map(|kw| normalized.iter().position(|h| h.contains(kw)))
        })
}

fn resolve_columns(headers: &[String]) -> Result<ColumnIndex> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| normalize_column_name(h).to_lowercase())
        .collect();

    let mut found = Vec::with_capacity(COLUMN_KEYWORDS.len());
    let mut missing = Vec::new();
    for (name, keywords) in COLUMN_KEYWORDS {
        match find_column(&normalized, keywords) {
            Some(idx) => found.push(idx),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(AnalystError::MissingColumns(missing));
    }

    Ok(ColumnIndex {
        rank: found[0],
        peak: found[1],
        title: found[2],
        gross: found[3],
        year: found[4],
    })
}

/// Turns a scraped films table into typed, complete records
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Strip footnotes from every cell and normalize every header
    pub fn clean_text(&self, raw: &RawTable) -> RawTable {
        RawTable {
            headers: raw.headers.iter().map(|h| normalize_column_name(h)).collect(),
            rows: raw
                .rows
                .iter()
                .map(|row| row.iter().map(|c| strip_footnotes(c)).collect())
                .collect(),
        }
    }

    /// Coerce the five films columns and drop rows missing any numeric value
    pub fn clean(&self, raw: &RawTable) -> Result<CleanedTable> {
        let text = self.clean_text(raw);
        let columns = resolve_columns(&text.headers)?;
        debug!("Resolved columns: {:?}", columns);

        let mut records = Vec::with_capacity(text.rows.len());
        let mut dropped = 0usize;

        for row in &text.rows {
            // A cell past the end of a ragged row counts as missing
            let cell = |idx: usize| row.get(idx).map(String::as_str);
            let rank = cell(columns.rank).and_then(extract_integer);
            let peak = cell(columns.peak).and_then(extract_integer);
            let year = cell(columns.year).and_then(extract_year);
            let gross = cell(columns.gross).and_then(parse_currency);

            match (rank, peak, year, gross, cell(columns.title)) {
                (Some(rank), Some(peak), Some(year), Some(worldwide_gross), Some(title)) => {
                    records.push(FilmRecord {
                        rank,
                        peak,
                        title: title.to_string(),
                        worldwide_gross,
                        year,
                    });
                }
                _ => {
                    debug!("Dropping incomplete row: {:?}", row);
                    dropped += 1;
                }
            }
        }

        AnalysisMetrics::record_cleaning(records.len(), dropped);
        info!("Cleaned table: {} rows kept, {} dropped", records.len(), dropped);

        if records.is_empty() {
            return Err(AnalystError::EmptyTable(
                "no rows with Rank, Peak, Year and Worldwide gross".to_string(),
            ));
        }

        Ok(CleanedTable::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|s| s.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|s| s.to_string()).collect());
        }
        table
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$2.5 billion"), Some(2_500_000_000.0));
        assert_eq!(parse_currency("$800 million"), Some(800_000_000.0));
        assert_eq!(parse_currency("$2,923,706,026"), Some(2_923_706_026.0));
        assert_eq!(parse_currency("$1.2 Billion"), Some(1_200_000_000.0));
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("garbage"), None);
        assert_eq!(parse_currency("-5"), None);
    }

    #[test]
    fn test_unparseable_currency_defaults_to_zero() {
        assert_eq!(parse_currency("").unwrap_or(0.0), 0.0);
        assert_eq!(parse_currency("garbage").unwrap_or(0.0), 0.0);
    }

    #[test]
    fn test_parse_currency_is_idempotent() {
        for input in ["$2.5 billion", "$800 million", "$2,797,501,328", "$1,515,047,671"] {
            let once = parse_currency(input).unwrap();
            let twice = parse_currency(&once.to_string()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2019[a]"), Some(2019));
        assert_eq!(extract_year("c. 1997"), Some(1997));
        assert_eq!(extract_year("N/A"), None);
        assert_eq!(extract_year("97"), None);
    }

    #[test]
    fn test_extract_integer() {
        assert_eq!(extract_integer("4TS3"), Some(4));
        assert_eq!(extract_integer("12"), Some(12));
        assert_eq!(extract_integer("—"), None);
    }

    #[test]
    fn test_strip_footnotes() {
        assert_eq!(strip_footnotes("Avatar[# 1][a]"), "Avatar");
        assert_eq!(strip_footnotes(" Star Wars:\nThe Force Awakens "), "Star Wars: The Force Awakens");
        assert_eq!(strip_footnotes("$2,923,706,026[3]"), "$2,923,706,026");
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Worldwide gross[2]"), "Worldwide gross");
        assert_eq!(normalize_column_name("Year "), "Year");
        assert_eq!(normalize_column_name("[x]"), "");
    }

    #[test]
    fn test_clean_drops_incomplete_rows() {
        let table = raw(
            &["Rank", "Peak", "Title", "Worldwide gross[1]", "Year"],
            &[
                &["1", "1", "Avatar[a]", "$2,923,706,026", "2009"],
                &["2", "1", "Avengers: Endgame", "$2,797,501,328", "N/A"],
                &["3", "1", "Titanic", "garbage", "1997"],
                &["4", "3", "Star Wars", "$2,068,223,624", "2015[b]"],
            ],
        );

        let cleaned = DataCleaner::new().clean(&table).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.records[0].title, "Avatar");
        assert_eq!(cleaned.records[1].year, 2015);
        assert_eq!(cleaned.records[1].peak, 3);
    }

    #[test]
    fn test_clean_resolves_film_and_gross_aliases() {
        let table = raw(
            &["Rank", "Peak", "Film", "Gross", "Year"],
            &[&["1", "1", "Avatar", "$2.9 billion", "2009"]],
        );
        let cleaned = DataCleaner::new().clean(&table).unwrap();
        assert_eq!(cleaned.records[0].title, "Avatar");
        assert_eq!(cleaned.records[0].worldwide_gross, 2_900_000_000.0);
    }

    #[test]
    fn test_clean_reports_missing_columns() {
        let table = raw(&["Rank", "Title", "Year"], &[&["1", "Avatar", "2009"]]);
        match DataCleaner::new().clean(&table) {
            Err(AnalystError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Peak".to_string(), "Worldwide gross".to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_drops_ragged_rows() {
        let table = RawTable {
            headers: ["Rank", "Peak", "Title", "Worldwide gross", "Year"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: vec![
                vec!["1".to_string()],
                ["2", "1", "Avengers: Endgame", "$2,797,501,328", "2019"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ],
        };

        let cleaned = DataCleaner::new().clean(&table).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.records[0].title, "Avengers: Endgame");
    }

    #[test]
    fn test_clean_only_ragged_rows_is_empty() {
        let table = RawTable {
            headers: ["Rank", "Peak", "Title", "Worldwide gross", "Year"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: vec![vec!["1".to_string()]],
        };
        assert!(matches!(
            DataCleaner::new().clean(&table),
            Err(AnalystError::EmptyTable(_))
        ));
    }

    #[test]
    fn test_clean_rows_missing_year_or_gross_leave_empty_table() {
        let table = raw(
            &["Rank", "Peak", "Title", "Worldwide gross", "Year"],
            &[
                &["1", "1", "Avatar", "TBA", "2009"],
                &["2", "1", "Avengers: Endgame", "$2,797,501,328", "unknown"],
            ],
        );
        assert!(matches!(
            DataCleaner::new().clean(&table),
            Err(AnalystError::EmptyTable(_))
        ));
    }

    #[test]
    fn test_clean_empty_after_dropping() {
        let table = raw(
            &["Rank", "Peak", "Title", "Worldwide gross", "Year"],
            &[&["-", "-", "Nothing", "$1", "2000"]],
        );
        assert!(matches!(
            DataCleaner::new().clean(&table),
            Err(AnalystError::EmptyTable(_))
        ));
    }
}
