//! fiichart core: closing-price history charts for a fixed ticker universe.
//!
//! This crate contains the whole pipeline except the terminal viewer:
//! - Domain types (tickers, daily bars, price series, the per-run series set)
//! - Market data provider trait and the Yahoo Finance adapter
//! - Fetch orchestrator with per-ticker failure isolation
//! - Renderer-independent figures and their PNG encoding
//! - Timestamped output directory management
//! - The run pipeline that sequences all of the above

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod output;
pub mod pipeline;

pub use chart::{ChartError, Figure};
pub use config::{ConfigError, FiiChartConfig};
pub use data::{DataUnavailable, FetchMode, MarketDataProvider};
pub use domain::{DailyBar, PriceSeries, PriceSeriesSet, Ticker};
pub use output::OutputLocation;
pub use pipeline::{run, ChartDisplay, NoDisplay, PipelineError, RunContext, RunReport};
