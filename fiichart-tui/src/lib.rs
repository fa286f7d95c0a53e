//! Terminal presentation of fiichart figures.
//!
//! [`TerminalViewer`] is the interactive [`fiichart_core::ChartDisplay`]: it
//! draws the combined chart full-screen and blocks until dismissed.

pub mod chart_panel;
pub mod theme;
pub mod viewer;

pub use chart_panel::FigurePanel;
pub use theme::Theme;
pub use viewer::TerminalViewer;
