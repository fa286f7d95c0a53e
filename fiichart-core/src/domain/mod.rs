//! Domain types for fiichart

pub mod series;
pub mod ticker;

pub use series::{DailyBar, InsertRejected, PriceSeries, PriceSeriesSet};
pub use ticker::Ticker;
