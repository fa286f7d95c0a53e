//! Closing-price charts: the shared figure model and its PNG encoding.

pub mod figure;
pub mod png;

pub use figure::{Figure, FigureBounds, FigureLine, TITLE, X_LABEL, Y_LABEL};
pub use png::ChartError;
