use crate::constants::{
    CORRELATION_DECIMALS, COURT_MOST_CASES_KEY, COURT_MOST_CASES_VALUE, COURT_PHRASE,
    COURT_PLOT_KEY, COURT_PLOT_VALUE, COURT_SLOPE_KEY, COURT_SLOPE_VALUE, FILMS_PHRASES,
};
use crate::error::{AnalystError, Result};
use crate::stats::round_to;
use crate::types::{ChartArtifact, FilmMetrics};
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Serialize, Serializer};

/// The analysis tasks the service knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTask {
    /// Statistics and a Rank/Peak chart over the highest-grossing films table
    HighestGrossingFilms,
    /// Indian high court judgments; answered with fixed placeholder values
    HighCourtJudgments,
}

impl AnalysisTask {
    /// Pick the task a free-text question refers to
    pub fn detect(question: &str) -> Result<Self> {
        let lowered = question.to_lowercase();
        if FILMS_PHRASES.iter().any(|p| lowered.contains(p)) {
            Ok(AnalysisTask::HighestGrossingFilms)
        } else if lowered.contains(COURT_PHRASE) {
            Ok(AnalysisTask::HighCourtJudgments)
        } else {
            Err(AnalystError::UnrecognizedTask)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisTask::HighestGrossingFilms => "films",
            AnalysisTask::HighCourtJudgments => "court",
        }
    }
}

/// Films answer, serialized as `[count, title, correlation, chart]`
#[derive(Debug, Clone, PartialEq)]
pub struct FilmsAnswer {
    pub two_bn_before_2020: usize,
    pub earliest_1_5bn_film: String,
    /// Already rounded to six decimals
    pub rank_peak_correlation: f64,
    pub chart: ChartArtifact,
}

impl FilmsAnswer {
    pub fn new(metrics: FilmMetrics, chart: ChartArtifact) -> Self {
        Self {
            two_bn_before_2020: metrics.two_bn_before_2020,
            earliest_1_5bn_film: metrics.earliest_1_5bn_film,
            rank_peak_correlation: round_to(metrics.rank_peak_correlation, CORRELATION_DECIMALS),
            chart,
        }
    }
}

impl Serialize for FilmsAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.two_bn_before_2020)?;
        tuple.serialize_element(&self.earliest_1_5bn_film)?;
        tuple.serialize_element(&self.rank_peak_correlation)?;
        tuple.serialize_element(&self.chart)?;
        tuple.end()
    }
}

/// Court answer, serialized as an object keyed by the three fixed questions
#[derive(Debug, Clone, PartialEq)]
pub struct CourtAnswer {
    pub most_cases_court: String,
    pub delay_slope: f64,
    pub delay_plot: String,
}

impl CourtAnswer {
    pub fn placeholder() -> Self {
        Self {
            most_cases_court: COURT_MOST_CASES_VALUE.to_string(),
            delay_slope: COURT_SLOPE_VALUE,
            delay_plot: COURT_PLOT_VALUE.to_string(),
        }
    }
}

impl Serialize for CourtAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(COURT_MOST_CASES_KEY, &self.most_cases_court)?;
        map.serialize_entry(COURT_SLOPE_KEY, &self.delay_slope)?;
        map.serialize_entry(COURT_PLOT_KEY, &self.delay_plot)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Films(FilmsAnswer),
    Court(CourtAnswer),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_films() {
        for q in [
            "Scrape the list of highest grossing films from Wikipedia.",
            "Use the Highest-Grossing Films page",
        ] {
            assert_eq!(AnalysisTask::detect(q).unwrap(), AnalysisTask::HighestGrossingFilms);
        }
    }

    #[test]
    fn test_detect_court() {
        let task = AnalysisTask::detect("Which High Court disposed the most cases?").unwrap();
        assert_eq!(task, AnalysisTask::HighCourtJudgments);
        assert_eq!(task.name(), "court");
    }

    #[test]
    fn test_detect_unknown() {
        let err = AnalysisTask::detect("What is the weather like?").unwrap_err();
        assert!(matches!(err, AnalystError::UnrecognizedTask));
    }

    #[test]
    fn test_films_answer_serializes_as_array() {
        let answer = FilmsAnswer::new(
            FilmMetrics {
                two_bn_before_2020: 1,
                earliest_1_5bn_film: "Titanic".to_string(),
                rank_peak_correlation: 0.48561234,
            },
            ChartArtifact("data:image/png;base64,AAAA".to_string()),
        );
        let value = serde_json::to_value(AnalysisResponse::Films(answer)).unwrap();
        assert_eq!(
            value,
            json!([1, "Titanic", 0.485612, "data:image/png;base64,AAAA"])
        );
    }

    #[test]
    fn test_court_answer_serializes_as_object() {
        let value = serde_json::to_value(AnalysisResponse::Court(CourtAnswer::placeholder())).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj[COURT_MOST_CASES_KEY], json!("33_10"));
        assert_eq!(obj[COURT_SLOPE_KEY], json!(0.123));
    }
}
