use crate::constants::{CHART_HEIGHT, CHART_WIDTH, DATA_URI_PNG_PREFIX, MAX_CHART_DIMENSION};
use crate::error::{AnalystError, Result};
use crate::stats::linear_fit;
use crate::types::ChartArtifact;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use plotters::prelude::*;
use tracing::{debug, warn};

/// Axis labels and caption for a scatterplot
#[derive(Debug, Clone)]
pub struct ChartLabels {
    pub x_label: String,
    pub y_label: String,
    pub title: String,
}

impl ChartLabels {
    pub fn new(x_label: &str, y_label: &str, title: &str) -> Self {
        Self {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            title: title.to_string(),
        }
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> AnalystError {
    AnalystError::Chart(e.to_string())
}

/// Padded `(min, max)` of the values; a flat range is widened by one unit each way
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}

/// Renders scatterplots with a dashed least squares line as PNG data URIs
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(CHART_WIDTH, CHART_HEIGHT)
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte length of the RGB buffer for this size
    fn buffer_len(&self) -> Result<usize> {
        if self.width == 0 || self.height == 0 {
            return Err(AnalystError::Chart(format!(
                "chart size {}x{} has a zero dimension",
                self.width, self.height
            )));
        }
        if self.width > MAX_CHART_DIMENSION || self.height > MAX_CHART_DIMENSION {
            return Err(AnalystError::Chart(format!(
                "chart size {}x{} exceeds the {} pixel limit",
                self.width, self.height, MAX_CHART_DIMENSION
            )));
        }
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| {
                AnalystError::Chart(format!("chart size {}x{} overflows", self.width, self.height))
            })
    }

    /// Draw the points, overlay the OLS line when it is defined, and return a
    /// `data:image/png;base64,` URI.
    pub fn render_scatter_with_regression(
        &self,
        xs: &[f64],
        ys: &[f64],
        labels: &ChartLabels,
    ) -> Result<ChartArtifact> {
        if xs.len() != ys.len() {
            return Err(AnalystError::Chart(format!(
                "x and y lengths differ ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(AnalystError::Chart("no points to plot".to_string()));
        }
        self.buffer_len()?;

        let rgb = self.draw(xs, ys, labels)?;
        let png = self.encode_png(&rgb)?;
        debug!("Rendered {}x{} chart, {} PNG bytes", self.width, self.height, png.len());

        Ok(ChartArtifact(format!(
            "{}{}",
            DATA_URI_PNG_PREFIX,
            STANDARD.encode(&png)
        )))
    }

    fn draw(&self, xs: &[f64], ys: &[f64], labels: &ChartLabels) -> Result<Vec<u8>> {
        match self.draw_with(xs, ys, Some(labels)) {
            Ok(buffer) => Ok(buffer),
            Err(e) => {
                // Text needs a system font; without one, keep the points and line.
                warn!("Chart text rendering failed ({}), drawing without labels", e);
                self.draw_with(xs, ys, None)
            }
        }
    }

    fn draw_with(&self, xs: &[f64], ys: &[f64], labels: Option<&ChartLabels>) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.buffer_len()?];
        let fit = linear_fit(xs, ys);

        let (x_min, x_max) = padded_range(xs.iter().copied());
        let line_ends = fit
            .map(|f| vec![f.predict(x_min), f.predict(x_max)])
            .unwrap_or_default();
        let (y_min, y_max) = padded_range(ys.iter().copied().chain(line_ends));

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let mut builder = ChartBuilder::on(&root);
            builder.margin(15);
            if let Some(labels) = labels {
                builder
                    .caption(&labels.title, ("sans-serif", 24))
                    .x_label_area_size(45)
                    .y_label_area_size(55);
            }
            let mut chart = builder
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(chart_err)?;

            let mut mesh = chart.configure_mesh();
            mesh.bold_line_style(BLACK.mix(0.12).stroke_width(1))
                .light_line_style(BLACK.mix(0.04).stroke_width(1));
            match labels {
                Some(labels) => {
                    mesh.x_desc(labels.x_label.as_str())
                        .y_desc(labels.y_label.as_str());
                }
                None => {
                    mesh.disable_x_axis().disable_y_axis();
                }
            }
            mesh.draw().map_err(chart_err)?;

            let point_style = BLUE.mix(0.6).filled();
            chart
                .draw_series(
                    xs.iter()
                        .zip(ys)
                        .map(|(&x, &y)| Circle::new((x, y), 4, point_style)),
                )
                .map_err(chart_err)?
                .label("Data")
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, point_style));

            if let Some(fit) = fit {
                let line_style = RED.stroke_width(2);
                chart
                    .draw_series(DashedLineSeries::new(
                        vec![(x_min, fit.predict(x_min)), (x_max, fit.predict(x_max))],
                        10,
                        6,
                        line_style,
                    ))
                    .map_err(chart_err)?
                    .label("Regression line")
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
            }

            if labels.is_some() {
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8).filled())
                    .border_style(&BLACK)
                    .draw()
                    .map_err(chart_err)?;
            }

            root.present().map_err(chart_err)?;
        }

        Ok(buffer)
    }

    fn encode_png(&self, rgb: &[u8]) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(rgb, self.width, self.height, ExtendedColorType::Rgb8)
            .map_err(chart_err)?;
        Ok(png)
    }
}
