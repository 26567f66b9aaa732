//! Historical market-impact calculator.
//!
//! Given an instrument and a news timestamp, measures the open-to-close move
//! of the first trading session on or after the trading-day anchor. Impact is
//! advisory: every data-source fault maps to `None` and the enrichment pass
//! carries on.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime};
use metrics::counter;
use std::sync::Arc;
use tracing::warn;

use crate::calendar::resolve_anchor;

/// Calendar days queried past the anchor. Absorbs a long weekend plus a
/// holiday cluster while bounding the query.
const LOOKAHEAD_DAYS: u64 = 5;

/// One actual trading session of daily history.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySession {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

/// Daily open/close history restricted to trading sessions, chronological.
/// Non-trading days are simply absent.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySession>>;
}

pub struct ImpactCalculator {
    source: Arc<dyn PriceSource>,
}

impl ImpactCalculator {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    /// Percentage move (rounded to 2 decimals) of the first session in the
    /// half-open window `[anchor, anchor + 5d)`, or `None` when no session
    /// exists or the source fails. A zero opening price yields `Some(0.0)`.
    pub async fn compute(&self, symbol: &str, published: NaiveDateTime) -> Option<f64> {
        let anchor = resolve_anchor(published);
        let end = anchor + Days::new(LOOKAHEAD_DAYS);

        let sessions = match self.source.history(symbol, anchor, end).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = ?e, symbol, "price history unavailable");
                counter!("impact_lookup_failures_total").increment(1);
                return None;
            }
        };

        let first = sessions.first()?;
        if first.open == 0.0 {
            return Some(0.0);
        }
        Some(round2(100.0 * (first.close - first.open) / first.open))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
