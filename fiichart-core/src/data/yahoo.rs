//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API. Prices are auto-adjusted:
//! when the response carries an adjusted close, every OHLC field is scaled by
//! `adjclose / close`.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; anything unexpected surfaces as `ResponseFormatChanged`.

use super::provider::{DataUnavailable, MarketDataProvider};
use crate::config::ProviderSettings;
use crate::domain::{DailyBar, PriceSeries, Ticker};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    /// Build the chart API URL for a symbol and time window.
    fn chart_url(
        base_url: &str,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Url, DataUnavailable> {
        let mut url = Url::parse(base_url)
            .map_err(|e| DataUnavailable::Other(format!("invalid base url {base_url}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DataUnavailable::Other(format!("base url cannot be a base: {base_url}")))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &start.timestamp().to_string())
            .append_pair("period2", &end.timestamp().to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true")
            .append_pair("includePrePost", "true");
        Ok(url)
    }

    /// Parse a chart API body into a price series.
    fn parse_body(symbol: &str, body: &str) -> Result<PriceSeries, DataUnavailable> {
        let chart: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataUnavailable::ResponseFormatChanged(format!(
                "failed to parse response for {symbol}: {e}"
            ))
        })?;
        Self::parse_response(symbol, chart)
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<PriceSeries, DataUnavailable> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataUnavailable::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataUnavailable::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataUnavailable::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result.into_iter().next().ok_or_else(|| DataUnavailable::EmptySeries {
            symbol: symbol.to_string(),
        })?;

        // A valid symbol with no trading days in the window has no timestamps.
        let timestamps = data.timestamp.unwrap_or_default();
        let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts + gmtoffset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataUnavailable::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let open = quote.open.get(i).copied().flatten().unwrap_or(close);
            let high = quote.high.get(i).copied().flatten().unwrap_or(close);
            let low = quote.low.get(i).copied().flatten().unwrap_or(close);
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

            let ratio = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten())
                .filter(|_| close != 0.0)
                .map(|adj| adj / close)
                .unwrap_or(1.0);

            bars.push(DailyBar {
                date,
                open: open * ratio,
                high: high * ratio,
                low: low * ratio,
                close: close * ratio,
                volume,
            });
        }

        let series = PriceSeries::from_bars(bars);
        if series.is_empty() {
            return Err(DataUnavailable::EmptySeries {
                symbol: symbol.to_string(),
            });
        }
        Ok(series)
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        ticker: &Ticker,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, DataUnavailable> {
        if start > end {
            return Err(DataUnavailable::InvalidWindow { start, end });
        }

        let symbol = ticker.as_str();
        if symbol.trim().is_empty() {
            return Err(DataUnavailable::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let url = Self::chart_url(&self.base_url, symbol, start, end)?;
        tracing::debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataUnavailable::NetworkUnreachable(e.to_string()))?;

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        if let Some(err) = status_error(resp.status(), retry_after, symbol) {
            return Err(err);
        }

        let body = resp
            .text()
            .map_err(|e| DataUnavailable::NetworkUnreachable(e.to_string()))?;

        Self::parse_body(symbol, &body)
    }
}

/// Error for a non-success HTTP status, or `None` when the body should be parsed.
fn status_error(
    status: reqwest::StatusCode,
    retry_after: Option<&str>,
    symbol: &str,
) -> Option<DataUnavailable> {
    use reqwest::StatusCode;

    if status == StatusCode::NOT_FOUND {
        Some(DataUnavailable::SymbolNotFound {
            symbol: symbol.to_string(),
        })
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(DataUnavailable::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(60),
        })
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(DataUnavailable::AuthenticationRequired(format!(
            "HTTP {status} from Yahoo Finance"
        )))
    } else if !status.is_success() {
        Some(DataUnavailable::Other(format!("HTTP {status} for {symbol}")))
    } else {
        None
    }
}
