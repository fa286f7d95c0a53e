//! Figure panel: draws a [`Figure`] as a ratatui line chart.
//!
//! Dates map to the x axis as days since the common era, so gaps between
//! trading days keep their true width.

use chrono::{Datelike, NaiveDate};
use fiichart_core::chart::FigureBounds;
use fiichart_core::Figure;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget,
    },
};

use crate::theme::Theme;

const HINT: &str = " q / Esc / Enter to continue ";

pub struct FigurePanel<'a> {
    figure: &'a Figure,
    theme: &'a Theme,
}

impl<'a> FigurePanel<'a> {
    pub fn new(figure: &'a Figure, theme: &'a Theme) -> Self {
        Self { figure, theme }
    }

    fn block(&self, title: String) -> Block<'static> {
        Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(Span::styled(HINT, self.theme.muted_style())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background))
    }
}

impl Widget for FigurePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.figure.is_empty() {
            let block = self.block(format!(" {} [No Data] ", self.figure.title));
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No ticker returned any closing prices.",
                    self.theme.muted_style(),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block);
            message.render(area, buf);
            return;
        }

        let bounds = self.figure.bounds();
        let data: Vec<Vec<(f64, f64)>> = self
            .figure
            .lines
            .iter()
            .map(|line| line.points.iter().map(|&(d, v)| (day_x(d), v)).collect())
            .collect();

        let datasets: Vec<Dataset<'_>> = self
            .figure
            .lines
            .iter()
            .zip(&data)
            .enumerate()
            .map(|(idx, (line, points))| {
                Dataset::default()
                    .name(line.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.line_color(idx)))
                    .data(points)
            })
            .collect();

        let muted = self.theme.muted_style();
        let chart = Chart::new(datasets)
            .block(self.block(format!(" {} ", self.figure.title)))
            .x_axis(
                Axis::default()
                    .title(Span::styled(self.figure.x_label.clone(), muted))
                    .style(muted)
                    .bounds([day_x(bounds.x_start), day_x(bounds.x_end)])
                    .labels(x_labels(&bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(self.figure.y_label.clone(), muted))
                    .style(muted)
                    .bounds([bounds.y_min, bounds.y_max])
                    .labels(y_labels(&bounds)),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

        chart.render(area, buf);
    }
}

fn day_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn x_labels(bounds: &FigureBounds) -> Vec<Span<'static>> {
    let mid_days = (bounds.x_start.num_days_from_ce() + bounds.x_end.num_days_from_ce()) / 2;
    let mid = NaiveDate::from_num_days_from_ce_opt(mid_days).unwrap_or(bounds.x_start);
    [bounds.x_start, mid, bounds.x_end]
        .into_iter()
        .map(|d| Span::raw(d.format("%m/%Y").to_string()))
        .collect()
}

fn y_labels(bounds: &FigureBounds) -> Vec<Span<'static>> {
    let mid = (bounds.y_min + bounds.y_max) / 2.0;
    [bounds.y_min, mid, bounds.y_max]
        .into_iter()
        .map(|v| Span::raw(format!("{v:.2}")))
        .collect()
}
