//! Statistics over the cleaned films table.
//!
//! Everything here is a pure function of its input.

use crate::constants::{CUTOFF_YEAR, ONE_POINT_FIVE_BILLION, TWO_BILLION};
use crate::types::{CleanedTable, FilmMetrics, FilmRecord};
use serde::{Deserialize, Serialize};

/// Rows grossing at least `min_gross` released strictly before `before_year`
pub fn count_grossing_before(table: &CleanedTable, min_gross: f64, before_year: i32) -> usize {
    table
        .records
        .iter()
        .filter(|r| r.worldwide_gross >= min_gross && r.year < before_year)
        .count()
}

/// Title of the earliest film grossing at least `min_gross`.
///
/// Ties on year keep the first row in table order. Empty when nothing qualifies.
pub fn earliest_title_grossing(table: &CleanedTable, min_gross: f64) -> String {
    let mut earliest: Option<&FilmRecord> = None;
    for record in table.records.iter().filter(|r| r.worldwide_gross >= min_gross) {
        match earliest {
            Some(best) if best.year <= record.year => {}
            _ => earliest = Some(record),
        }
    }
    earliest.map(|r| r.title.clone()).unwrap_or_default()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation coefficient, or 0.0 when it is undefined
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }

    let mx = mean(xs);
    let my = mean(ys);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Degree-1 least squares fit `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares line through the points. `None` with fewer than two
/// points, mismatched lengths or no spread in x.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mx = mean(xs);
    let my = mean(ys);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let fit = LinearFit {
        slope,
        intercept: my - slope * mx,
    };
    (fit.slope.is_finite() && fit.intercept.is_finite()).then_some(fit)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, table: &CleanedTable) -> FilmMetrics {
        FilmMetrics {
            two_bn_before_2020: count_grossing_before(table, TWO_BILLION, CUTOFF_YEAR),
            earliest_1_5bn_film: earliest_title_grossing(table, ONE_POINT_FIVE_BILLION),
            rank_peak_correlation: pearson(&table.ranks(), &table.peaks()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str, gross: f64, year: i32) -> FilmRecord {
        FilmRecord {
            rank: 1,
            peak: 1,
            title: title.to_string(),
            worldwide_gross: gross,
            year,
        }
    }

    #[test]
    fn test_two_billion_count() {
        let table = CleanedTable::new(vec![
            film("A", 2.1e9, 2015),
            film("B", 1.9e9, 2010),
            film("C", 2.2e9, 2021),
        ]);
        assert_eq!(count_grossing_before(&table, TWO_BILLION, CUTOFF_YEAR), 1);
    }

    #[test]
    fn test_two_billion_boundaries() {
        let table = CleanedTable::new(vec![film("A", 2e9, 2019), film("B", 2e9, 2020)]);
        assert_eq!(count_grossing_before(&table, TWO_BILLION, CUTOFF_YEAR), 1);
    }

    #[test]
    fn test_earliest_film() {
        let table = CleanedTable::new(vec![film("A", 1.6e9, 2015), film("B", 2e9, 2012)]);
        assert_eq!(earliest_title_grossing(&table, ONE_POINT_FIVE_BILLION), "B");
    }

    #[test]
    fn test_earliest_film_tie_keeps_first() {
        let table = CleanedTable::new(vec![
            film("Low", 1.0e9, 1990),
            film("First", 1.6e9, 2012),
            film("Second", 2e9, 2012),
        ]);
        assert_eq!(earliest_title_grossing(&table, ONE_POINT_FIVE_BILLION), "First");
    }

    #[test]
    fn test_earliest_film_none_qualify() {
        let table = CleanedTable::new(vec![film("A", 1.0e9, 2015)]);
        assert_eq!(earliest_title_grossing(&table, ONE_POINT_FIVE_BILLION), "");
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((r - 1.0).abs() < 1e-12);

        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_linear_fit() {
        let fit = linear_fit(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.predict(4.0) - 9.0).abs() < 1e-12);

        assert!(linear_fit(&[2.0, 2.0], &[1.0, 3.0]).is_none());
        assert!(linear_fit(&[1.0], &[1.0]).is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456789, 6), 0.123457);
        assert_eq!(round_to(-0.5, 0), -1.0);
    }

    #[test]
    fn test_engine_single_row() {
        let table = CleanedTable::new(vec![film("Avatar", 2.9e9, 2009)]);
        let metrics = StatisticsEngine::new().analyze(&table);
        assert_eq!(metrics.two_bn_before_2020, 1);
        assert_eq!(metrics.earliest_1_5bn_film, "Avatar");
        assert_eq!(metrics.rank_peak_correlation, 0.0);
    }
}
