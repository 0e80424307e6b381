// =============================================================================
// Historical Data Fetcher — provider chart API + resampling
// =============================================================================
//
// Downloads hourly OHLCV history from the Yahoo-style chart endpoint and
// resamples it to the engine's coarser bar size (4-hourly by default).
//
// The provider payload is a struct-of-arrays:
//
//   chart.result[0].timestamp            — epoch seconds per row
//   chart.result[0].indicators.quote[0]  — open/high/low/close/volume arrays
//
// Rows with any null field are skipped.  Resampling buckets rows into
// epoch-aligned windows: open = first, high = max, low = min, close = last,
// volume = sum; empty buckets simply do not appear.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use crate::types::Bar;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct BarFetcher {
    client: reqwest::Client,
}

impl BarFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("nifty-sentinel/1.0")
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Download `range` of history for `symbol` at `interval` granularity
    /// and resample it to `resample_hours`-wide bars.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
        resample_hours: u32,
    ) -> Result<Vec<Bar>> {
        let url = format!("{CHART_BASE_URL}/{symbol}?range={range}&interval={interval}");
        debug!(symbol = %symbol, url = %url, "fetching history");

        let payload: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("chart request for {symbol} failed"))?
            .error_for_status()
            .with_context(|| format!("chart request for {symbol} was rejected"))?
            .json()
            .await
            .with_context(|| format!("chart response for {symbol} was not JSON"))?;

        let hourly = parse_chart_payload(&payload)
            .with_context(|| format!("malformed chart payload for {symbol}"))?;
        let bars = resample(&hourly, resample_hours);

        info!(
            symbol = %symbol,
            hourly = hourly.len(),
            resampled = bars.len(),
            "history fetched"
        );
        Ok(bars)
    }
}

impl Default for BarFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract hourly bars from the provider's chart JSON.  Rows with null
/// entries are skipped; output is sorted with duplicate timestamps removed.
pub fn parse_chart_payload(payload: &serde_json::Value) -> Result<Vec<Bar>> {
    let result = &payload["chart"]["result"][0];

    let timestamps = result["timestamp"]
        .as_array()
        .context("missing field chart.result[0].timestamp")?;

    let quote = &result["indicators"]["quote"][0];
    let opens = quote["open"]
        .as_array()
        .context("missing field indicators.quote[0].open")?;
    let highs = quote["high"]
        .as_array()
        .context("missing field indicators.quote[0].high")?;
    let lows = quote["low"]
        .as_array()
        .context("missing field indicators.quote[0].low")?;
    let closes = quote["close"]
        .as_array()
        .context("missing field indicators.quote[0].close")?;
    let volumes = quote["volume"]
        .as_array()
        .context("missing field indicators.quote[0].volume")?;

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(secs) = ts.as_i64() else { continue };
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            opens.get(i).and_then(|v| v.as_f64()),
            highs.get(i).and_then(|v| v.as_f64()),
            lows.get(i).and_then(|v| v.as_f64()),
            closes.get(i).and_then(|v| v.as_f64()),
            volumes.get(i).and_then(|v| v.as_f64()),
        ) else {
            continue; // partial row — provider fills gaps with nulls
        };

        let Some(timestamp) = Utc.timestamp_opt(secs, 0).single() else {
            continue;
        };
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Aggregate fine-grained bars into epoch-aligned `bucket_hours`-wide bars.
///
/// The output is strictly increasing by bucket start; a zero bucket width
/// returns the input unchanged.
pub fn resample(bars: &[Bar], bucket_hours: u32) -> Vec<Bar> {
    if bucket_hours == 0 {
        return bars.to_vec();
    }
    let bucket_secs = i64::from(bucket_hours) * 3600;

    struct Bucket {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    }

    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
    for bar in bars {
        let start = bar.timestamp.timestamp().div_euclid(bucket_secs) * bucket_secs;
        buckets
            .entry(start)
            .and_modify(|b| {
                b.high = b.high.max(bar.high);
                b.low = b.low.min(bar.low);
                b.close = bar.close;
                b.volume += bar.volume;
            })
            .or_insert(Bucket {
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            });
    }

    buckets
        .into_iter()
        .filter_map(|(start, b)| {
            let timestamp = Utc.timestamp_opt(start, 0).single()?;
            Some(Bar {
                timestamp,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
        })
        .collect()
}
