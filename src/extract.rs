//! Entity extraction: headline -> candidate ticker + follow-up question.
//!
//! One oracle prompt per headline, asking for a fixed two-field JSON object.
//! The oracle is best-effort; any call or decode failure yields an empty
//! extraction so a single bad headline never halts the batch.

use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::oracle::{strip_code_fences, Oracle};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Exchange-suffixed ticker (`.NS`/`.BO`), if the headline names one.
    pub ticker: Option<String>,
    /// Short natural follow-up question (3-6 words).
    pub question: Option<String>,
}

pub struct EntityExtractor {
    oracle: Arc<dyn Oracle>,
}

impl EntityExtractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    pub async fn extract(&self, headline: &str) -> Extraction {
        let prompt = extraction_prompt(headline);
        match self.oracle.generate(&prompt).await {
            Ok(raw) => parse_extraction(&raw),
            Err(e) => {
                warn!(error = ?e, headline, "entity extraction call failed");
                Extraction::default()
            }
        }
    }
}

fn extraction_prompt(headline: &str) -> String {
    format!(
        r#"Analyze this news headline and return a JSON object with two fields:
1. "ticker": The primary Indian stock market ticker (NSE/BSE) for the company mentioned. Suffix with .NS or .BO. If none, use null.
2. "short_question": A very short, natural 3-6 word question a user would ask about this impact.

Headline: "{headline}"

Example Output: {{ "ticker": "TATAMOTORS.NS", "short_question": "Impact of Tata EV launch?" }}
Example Output: {{ "ticker": null, "short_question": "Market sentiment today?" }}"#
    )
}

/// Decode the oracle's answer. Fences are stripped first; if the cleaned text
/// still fails to decode, the outermost `{...}` slice is tried before giving
/// up and returning an empty extraction.
fn parse_extraction(raw: &str) -> Extraction {
    #[derive(Deserialize)]
    struct Fields {
        #[serde(default)]
        ticker: Option<String>,
        #[serde(default)]
        short_question: Option<String>,
    }

    let cleaned = strip_code_fences(raw);
    let decoded = serde_json::from_str::<Fields>(&cleaned).or_else(|first_err| {
        match outer_json_object(&cleaned) {
            Some(slice) => serde_json::from_str::<Fields>(slice),
            None => Err(first_err),
        }
    });

    match decoded {
        Ok(f) => Extraction {
            ticker: f.ticker,
            question: f.short_question,
        },
        Err(e) => {
            warn!(error = %e, raw, "unparseable extraction output");
            Extraction::default()
        }
    }
}

fn outer_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}
