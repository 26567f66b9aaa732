//! Daily price history from the Yahoo Finance chart API.
//!
//! Free daily open/close bars for exchange-suffixed symbols (`.NS`/`.BO`
//! included). The chart payload carries parallel timestamp/quote arrays with
//! occasional `null` entries; parsing is defensive and anything malformed is
//! surfaced as an error for the impact calculator to absorb.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;

use crate::impact::{DailySession, PriceSource};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct YahooPriceSource {
    http: reqwest::Client,
}

impl YahooPriceSource {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("marketpulse-enricher/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySession>> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let resp = self
            .http
            .get(format!("{CHART_BASE}/{symbol}"))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("chart request for {symbol}"))?
            .error_for_status()
            .with_context(|| format!("chart response for {symbol}"))?;

        let body: ChartResponse = resp
            .json()
            .await
            .with_context(|| format!("chart payload for {symbol}"))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| anyhow!("no chart data for {symbol}"))?;

        Ok(sessions_from_chart(&result, start, end))
    }
}

/// Zip the parallel arrays into sessions, dropping entries with a missing
/// timestamp or quote and clamping to the half-open `[start, end)` window.
fn sessions_from_chart(result: &ChartResult, start: NaiveDate, end: NaiveDate) -> Vec<DailySession> {
    let timestamps = result.timestamp.as_deref().unwrap_or_default();
    let quote = match result.indicators.quote.first() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let mut sessions = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = match DateTime::from_timestamp(ts, 0) {
            Some(dt) => dt.date_naive(),
            None => continue,
        };
        if date < start || date >= end {
            continue;
        }
        let (open, close) = match (
            quote.open.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) {
            (Some(o), Some(c)) => (o, c),
            _ => continue,
        };
        sessions.push(DailySession { date, open, close });
    }
    sessions
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}
