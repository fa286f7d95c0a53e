//! PNG encoding of a [`Figure`] through plotters' bitmap backend.

use super::figure::Figure;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to draw chart {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

fn draw_err<E: Display>(path: &Path) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::Draw {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl Figure {
    /// Encode the figure as a PNG at `path`. The parent directory must exist.
    pub fn save_png(&self, path: &Path) -> Result<(), ChartError> {
        let bounds = self.bounds();

        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err(path))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title.as_str(), ("sans-serif", 24).into_font())
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(bounds.x_start..bounds.x_end, bounds.y_min..bounds.y_max)
            .map_err(draw_err(path))?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .x_labels(8)
            .y_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%m/%Y").to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.2}"))
            .draw()
            .map_err(draw_err(path))?;

        for (idx, line) in self.lines.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    line.points.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(draw_err(path))?
                .label(line.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        if !self.lines.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err(path))?;
        }

        root.present().map_err(draw_err(path))?;
        tracing::debug!(path = %path.display(), lines = self.lines.len(), "chart written");
        Ok(())
    }
}
