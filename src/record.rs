//! Backlog record model.
//!
//! The on-disk backlog is a JSON list of field-mappings where *key presence*
//! (not nullness) marks batch-processing state: a record is done once both
//! the `ticker` and `actual_impact` keys exist, whatever their values. In
//! the domain that convention is a tagged variant, [`BatchState`]; the wire
//! shape is preserved through [`RecordWire`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Serde adapter for the backlog's `"%Y-%m-%d %H:%M:%S"` timestamps
/// (second precision, local market time).
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Batch-processing state of a record.
///
/// `Processed` means the entity extractor has run, regardless of whether it
/// found a ticker or whether the impact lookup succeeded. This is the
/// idempotence marker the batch pass skips on.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchState {
    Unprocessed,
    Processed {
        /// Exchange-suffixed instrument identifier, if one was found.
        ticker: Option<String>,
        /// Signed percentage move of the first tradable session, if any.
        impact: Option<f64>,
    },
}

/// One distinct headline occurrence under enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordWire", into = "RecordWire")]
pub struct NewsRecord {
    pub headline: String,
    pub timestamp: NaiveDateTime,
    /// Unique content locator; dedup and cache key for the whole backlog.
    pub link: String,
    pub image_url: Option<String>,
    pub suggested_question: Option<String>,
    pub full_content: Option<String>,
    pub sentiment: Option<String>,
    pub state: BatchState,
}

impl NewsRecord {
    pub fn new(headline: impl Into<String>, timestamp: NaiveDateTime, link: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            timestamp,
            link: link.into(),
            image_url: None,
            suggested_question: None,
            full_content: None,
            sentiment: None,
            state: BatchState::Unprocessed,
        }
    }

    pub fn is_batch_processed(&self) -> bool {
        matches!(self.state, BatchState::Processed { .. })
    }
}

/// Deserializes a present key into `Some(value)`, so that an explicit JSON
/// `null` becomes `Some(None)` while a missing key stays `None` (via
/// `#[serde(default)]`).
fn presence<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Exact on-disk shape of a backlog record. Field order is the serialization
/// order; optional keys are omitted entirely when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordWire {
    headline: String,
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "presence")]
    ticker: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "presence")]
    actual_impact: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sentiment: Option<String>,
}

impl From<RecordWire> for NewsRecord {
    fn from(w: RecordWire) -> Self {
        // Both keys present (values may be null) => processed. A stray single
        // key does not satisfy the done-invariant and the record is re-enriched.
        let state = match (w.ticker, w.actual_impact) {
            (Some(ticker), Some(impact)) => BatchState::Processed { ticker, impact },
            _ => BatchState::Unprocessed,
        };
        Self {
            headline: w.headline,
            timestamp: w.timestamp,
            link: w.link,
            image_url: w.image_url,
            suggested_question: w.suggested_question,
            full_content: w.full_content,
            sentiment: w.sentiment,
            state,
        }
    }
}

impl From<NewsRecord> for RecordWire {
    fn from(r: NewsRecord) -> Self {
        let (ticker, actual_impact) = match r.state {
            BatchState::Unprocessed => (None, None),
            BatchState::Processed { ticker, impact } => (Some(ticker), Some(impact)),
        };
        Self {
            headline: r.headline,
            timestamp: r.timestamp,
            link: r.link,
            image_url: r.image_url,
            ticker,
            suggested_question: r.suggested_question,
            actual_impact,
            full_content: r.full_content,
            sentiment: r.sentiment,
        }
    }
}
