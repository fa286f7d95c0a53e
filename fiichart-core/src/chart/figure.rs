//! Figure: renderer-independent closing-price chart.
//!
//! Both presentation modes draw from the same figure: the terminal viewer in
//! `fiichart-tui` and the PNG writer in [`super::png`].

use crate::config::ChartSettings;
use crate::domain::{PriceSeries, PriceSeriesSet, Ticker};
use chrono::{Days, NaiveDate};

pub const TITLE: &str = "Histórico de Fechamento";
pub const X_LABEL: &str = "Data";
pub const Y_LABEL: &str = "Preço de Fechamento";

/// One labelled close-vs-date line.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLine {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Axis bounds with padding applied; never degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureBounds {
    pub x_start: NaiveDate,
    pub x_end: NaiveDate,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<FigureLine>,
    /// Pixel size used when the figure is encoded to an image.
    pub size: (u32, u32),
}

impl Figure {
    /// One line per entry of `set`, in set order.
    pub fn combined(set: &PriceSeriesSet) -> Self {
        let defaults = ChartSettings::default();
        Self {
            title: TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            lines: set
                .iter()
                .filter_map(|(ticker, series)| line_for(ticker, series))
                .collect(),
            size: (defaults.combined_width, defaults.combined_height),
        }
    }

    /// Single-line chart titled with the ticker.
    pub fn single(ticker: &Ticker, series: &PriceSeries) -> Self {
        let defaults = ChartSettings::default();
        Self {
            title: format!("{TITLE} - {ticker}"),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            lines: line_for(ticker, series).into_iter().collect(),
            size: (defaults.single_width, defaults.single_height),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Earliest and latest date over every line.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.points().fold(None, |acc, (d, _)| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }

    /// Lowest and highest close over every line.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points().fold(None, |acc, (_, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Plot bounds: 5% vertical padding, at least one day horizontally.
    ///
    /// An empty figure gets a fixed placeholder range so it can still be drawn.
    pub fn bounds(&self) -> FigureBounds {
        let (x_start, x_end) = match self.date_range() {
            Some((lo, hi)) if lo < hi => (lo, hi),
            Some((lo, _)) => (lo, lo + Days::new(1)),
            None => (NaiveDate::default(), NaiveDate::default() + Days::new(1)),
        };

        let (y_min, y_max) = match self.value_range() {
            Some((lo, hi)) => {
                let range = hi - lo;
                let pad = if range > 0.0 {
                    range * 0.05
                } else {
                    (hi.abs() * 0.05).max(1.0)
                };
                (lo - pad, hi + pad)
            }
            None => (0.0, 1.0),
        };

        FigureBounds {
            x_start,
            x_end,
            y_min,
            y_max,
        }
    }

    fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.lines.iter().flat_map(|l| l.points.iter().copied())
    }
}

/// Empty series are skipped rather than drawn as zero-length lines.
fn line_for(ticker: &Ticker, series: &PriceSeries) -> Option<FigureLine> {
    if series.is_empty() {
        return None;
    }
    Some(FigureLine {
        label: ticker.to_string(),
        points: series.closes().collect(),
    })
}
