use crate::constants::{
    BROWSER_USER_AGENT, CHART_HEIGHT, CHART_SOFT_BUDGET_CHARS, CHART_WIDTH, FILMS_URL,
    MAX_CHART_DIMENSION,
};
use crate::error::{AnalystError, Result};
use crate::types::HeaderMatchMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub films: FilmsConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilmsConfig {
    pub url: String,
    pub user_agent: String,
    /// Client-side timeout for the page fetch; unset means no timeout
    pub fetch_timeout_secs: Option<u64>,
    pub header_match: HeaderMatchMode,
}

impl Default for FilmsConfig {
    fn default() -> Self {
        Self {
            url: FILMS_URL.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            fetch_timeout_secs: None,
            header_match: HeaderMatchMode::Substring,
        }
    }
}

impl FilmsConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Data URIs longer than this are logged; they are still returned
    pub soft_budget_chars: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            soft_budget_chars: CHART_SOFT_BUDGET_CHARS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_prefix: "analyst.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Address for the Prometheus exporter; metrics are off when unset
    pub addr: Option<String>,
}

fn parse_dimension(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| AnalystError::Config(format!("Invalid {} '{}': {}", key, value, e)))
}

impl Config {
    /// Load configuration: `.env`, then the TOML file, then environment overrides.
    ///
    /// An explicit path (argument or `ANALYST_CONFIG`) must exist; the default
    /// `config.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let explicit: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("ANALYST_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalystError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject chart sizes the renderer cannot allocate
    pub fn validate(&self) -> Result<()> {
        let (width, height) = (self.chart.width, self.chart.height);
        if width == 0 || height == 0 || width > MAX_CHART_DIMENSION || height > MAX_CHART_DIMENSION {
            return Err(AnalystError::Config(format!(
                "chart size {}x{} must be between 1 and {} pixels per side",
                width, height, MAX_CHART_DIMENSION
            )));
        }
        Ok(())
    }

    /// Apply `HOST`, `PORT`, `ANALYST_FILMS_URL`, `ANALYST_LOG_DIR`,
    /// `ANALYST_METRICS_ADDR`, `ANALYST_CHART_WIDTH` and `ANALYST_CHART_HEIGHT`
    /// from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| AnalystError::Config(format!("Invalid PORT '{}': {}", port, e)))?;
        }
        if let Some(url) = lookup("ANALYST_FILMS_URL") {
            self.films.url = url;
        }
        if let Some(dir) = lookup("ANALYST_LOG_DIR") {
            self.logging.dir = dir;
        }
        if let Some(addr) = lookup("ANALYST_METRICS_ADDR") {
            self.metrics.addr = Some(addr);
        }
        if let Some(width) = lookup("ANALYST_CHART_WIDTH") {
            self.chart.width = parse_dimension("ANALYST_CHART_WIDTH", &width)?;
        }
        if let Some(height) = lookup("ANALYST_CHART_HEIGHT") {
            self.chart.height = parse_dimension("ANALYST_CHART_HEIGHT", &height)?;
        }
        self.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.request_timeout_secs, 180);
        assert_eq!(config.films.url, FILMS_URL);
        assert_eq!(config.films.header_match, HeaderMatchMode::Substring);
        assert!(config.films.fetch_timeout().is_none());
        assert_eq!(config.chart.soft_budget_chars, 100_000);
        assert!(config.metrics.addr.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9000

            [films]
            header_match = "exact"
            fetch_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.films.header_match, HeaderMatchMode::Exact);
        assert_eq!(config.films.fetch_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.chart.width, 800);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chart]\nwidth = 640\nheight = 480").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!((config.chart.width, config.chart.height), (640, 480));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "8123"),
            ("ANALYST_FILMS_URL", "http://localhost/films"),
            ("ANALYST_METRICS_ADDR", "127.0.0.1:9464"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.films.url, "http://localhost/films");
        assert_eq!(config.metrics.addr.as_deref(), Some("127.0.0.1:9464"));
    }

    #[test]
    fn test_rejects_bad_chart_size_in_toml() {
        for toml in ["[chart]\nwidth = 0", "[chart]\nheight = 70000"] {
            let err = Config::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, AnalystError::Config(_)), "{}", toml);
        }
    }

    #[test]
    fn test_chart_size_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(|k| match k {
                "ANALYST_CHART_WIDTH" => Some("1024".to_string()),
                "ANALYST_CHART_HEIGHT" => Some("768".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!((config.chart.width, config.chart.height), (1024, 768));

        let err = config
            .apply_overrides(|k| (k == "ANALYST_CHART_WIDTH").then(|| "100000".to_string()))
            .unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
    }
}
