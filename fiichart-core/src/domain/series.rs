//! Daily bars, per-ticker price series and the per-run series set.

use super::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for a single ticker.
///
/// Prices are auto-adjusted by the provider layer. Only `date` and `close`
/// feed the charts; the remaining fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    /// Bar carrying only a close, with OHLC collapsed onto it.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Date-ascending series of daily bars for one ticker.
///
/// Invariants: dates strictly increasing, every close finite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    /// Build a series from provider rows in any order.
    ///
    /// Rows with a non-finite close are dropped. When a date repeats, the row
    /// that came last in the input wins.
    pub fn from_bars(bars: Vec<DailyBar>) -> Self {
        let mut indexed: Vec<(usize, DailyBar)> = bars
            .into_iter()
            .filter(|b| b.close.is_finite())
            .enumerate()
            .collect();
        // Stable sort by (date, arrival) then keep the last row per date.
        indexed.sort_by(|a, b| a.1.date.cmp(&b.1.date).then(a.0.cmp(&b.0)));

        let mut out: Vec<DailyBar> = Vec::with_capacity(indexed.len());
        for (_, bar) in indexed {
            match out.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => out.push(bar),
            }
        }
        Self { bars: out }
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// `(date, close)` pairs in date order.
    pub fn closes(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.bars.iter().map(|b| (b.date, b.close))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Minimum and maximum close, or `None` for an empty series.
    pub fn close_range(&self) -> Option<(f64, f64)> {
        self.bars.iter().fold(None, |acc, b| match acc {
            None => Some((b.close, b.close)),
            Some((lo, hi)) => Some((lo.min(b.close), hi.max(b.close))),
        })
    }
}

/// Insertion-ordered mapping from ticker to its (non-empty) price series.
///
/// Built once per run by the fetch orchestrator and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PriceSeriesSet {
    entries: Vec<(Ticker, PriceSeries)>,
}

/// Reason an insert into a [`PriceSeriesSet`] was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertRejected {
    EmptySeries,
    DuplicateTicker,
}

impl PriceSeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Empty series and repeated tickers are refused.
    pub fn insert(&mut self, ticker: Ticker, series: PriceSeries) -> Result<(), InsertRejected> {
        if series.is_empty() {
            return Err(InsertRejected::EmptySeries);
        }
        if self.contains(&ticker) {
            return Err(InsertRejected::DuplicateTicker);
        }
        self.entries.push((ticker, series));
        Ok(())
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&PriceSeries> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, s)| s)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.entries.iter().any(|(t, _)| t == ticker)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &PriceSeries)> {
        self.entries.iter().map(|(t, s)| (t, s))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.entries.iter().map(|(t, _)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn from_bars_sorts_ascending() {
        let series = PriceSeries::from_bars(vec![
            DailyBar::close_only(d(2024, 1, 3), 3.0),
            DailyBar::close_only(d(2024, 1, 1), 1.0),
            DailyBar::close_only(d(2024, 1, 2), 2.0),
        ]);
        let dates: Vec<_> = series.closes().map(|(date, _)| date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
    }

    #[test]
    fn duplicate_date_keeps_last_row() {
        let series = PriceSeries::from_bars(vec![
            DailyBar::close_only(d(2024, 1, 2), 10.0),
            DailyBar::close_only(d(2024, 1, 1), 9.0),
            DailyBar::close_only(d(2024, 1, 2), 10.5),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[1].close, 10.5);
    }

    #[test]
    fn non_finite_closes_are_dropped() {
        let series = PriceSeries::from_bars(vec![
            DailyBar::close_only(d(2024, 1, 1), f64::NAN),
            DailyBar::close_only(d(2024, 1, 2), 5.0),
            DailyBar::close_only(d(2024, 1, 3), f64::INFINITY),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(d(2024, 1, 2)));
    }

    #[test]
    fn close_range_of_empty_series_is_none() {
        assert_eq!(PriceSeries::default().close_range(), None);
    }

    #[test]
    fn close_range_spans_min_and_max() {
        let series = PriceSeries::from_bars(vec![
            DailyBar::close_only(d(2024, 1, 1), 7.0),
            DailyBar::close_only(d(2024, 1, 2), 3.0),
            DailyBar::close_only(d(2024, 1, 3), 9.0),
        ]);
        assert_eq!(series.close_range(), Some((3.0, 9.0)));
    }

    #[test]
    fn set_refuses_empty_series() {
        let mut set = PriceSeriesSet::new();
        let result = set.insert(Ticker::new("A"), PriceSeries::default());
        assert_eq!(result, Err(InsertRejected::EmptySeries));
        assert!(set.is_empty());
    }

    #[test]
    fn set_refuses_duplicate_ticker() {
        let series = PriceSeries::from_bars(vec![DailyBar::close_only(d(2024, 1, 1), 1.0)]);
        let mut set = PriceSeriesSet::new();
        set.insert(Ticker::new("A"), series.clone()).unwrap();
        assert_eq!(
            set.insert(Ticker::new("A"), series),
            Err(InsertRejected::DuplicateTicker)
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_preserves_insertion_order() {
        let series = PriceSeries::from_bars(vec![DailyBar::close_only(d(2024, 1, 1), 1.0)]);
        let mut set = PriceSeriesSet::new();
        for sym in ["VISC11.SA", "HGLG11.SA", "MXRF11.SA"] {
            set.insert(Ticker::new(sym), series.clone()).unwrap();
        }
        let order: Vec<&str> = set.tickers().map(|t| t.as_str()).collect();
        assert_eq!(order, vec!["VISC11.SA", "HGLG11.SA", "MXRF11.SA"]);
    }
}
