use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("No suitable table found: {0}")]
    NoTableFound(String),

    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("No data available after cleaning: {0}")]
    EmptyTable(String),

    #[error("Unknown analysis task in question.")]
    UnrecognizedTask,

    #[error("No question file uploaded")]
    MissingQuestion,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Question is not valid UTF-8: {0}")]
    InvalidQuestionEncoding(#[from] std::string::FromUtf8Error),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalystError {
    /// HTTP status surfaced at the API boundary. Only question-level problems
    /// are client errors; everything else is reported as a server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalystError::UnrecognizedTask
            | AnalystError::MissingQuestion
            | AnalystError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AnalystError::Fetch(_) => "fetch",
            AnalystError::NoTableFound(_) => "no_table_found",
            AnalystError::MissingColumns(_) => "missing_columns",
            AnalystError::EmptyTable(_) => "empty_table",
            AnalystError::UnrecognizedTask => "unrecognized_task",
            AnalystError::MissingQuestion => "missing_question",
            AnalystError::InvalidUpload(_) => "invalid_upload",
            AnalystError::InvalidQuestionEncoding(_) => "invalid_encoding",
            AnalystError::Chart(_) => "chart",
            AnalystError::Config(_) => "config",
            AnalystError::Io(_) => "io",
            AnalystError::Toml(_) => "toml",
            AnalystError::Json(_) => "json",
        }
    }
}

impl From<reqwest::Error> for AnalystError {
    fn from(e: reqwest::Error) -> Self {
        AnalystError::Fetch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalystError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AnalystError::UnrecognizedTask.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalystError::MissingQuestion.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AnalystError::Fetch("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AnalystError::NoTableFound("none".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_columns_message() {
        let err = AnalystError::MissingColumns(vec!["Rank".into(), "Peak".into()]);
        assert_eq!(err.to_string(), "Missing columns: [\"Rank\", \"Peak\"]");
    }
}
