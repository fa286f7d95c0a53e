//! Market data: provider trait, Yahoo Finance adapter and the fetch orchestrator.

pub mod fetch;
pub mod provider;
pub mod yahoo;

pub use fetch::{fetch_all, fetch_all_until, FetchMode, FetchOutcome};
pub use provider::{
    failure_line, ConsoleProgress, DataUnavailable, FetchProgress, MarketDataProvider,
    SilentProgress,
};
pub use yahoo::YahooProvider;
