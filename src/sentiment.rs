//! Coarse sentiment classification over article text.
//!
//! Lexicon scorer with a short negation window, evaluated over a capped
//! prefix of the article for latency control. The lexicon is initialized at
//! most once, however many callers race the first classification; a failed
//! initialization permanently degrades the classifier to the neutral
//! default instead of raising.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Only this many leading characters participate in scoring.
pub const SENTIMENT_PREFIX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f32,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

pub struct SentimentRuntime {
    // None after a failed init: the classifier stays disabled for the
    // process lifetime and every call returns the neutral default.
    lexicon: OnceCell<Option<Lexicon>>,
}

impl SentimentRuntime {
    pub fn new() -> Self {
        Self {
            lexicon: OnceCell::new(),
        }
    }

    fn lexicon(&self) -> Option<&Lexicon> {
        self.lexicon
            .get_or_init(|| match Lexicon::embedded() {
                Ok(lex) => Some(lex),
                Err(e) => {
                    warn!(error = %e, "sentiment lexicon failed to load; classifier disabled");
                    None
                }
            })
            .as_ref()
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let Some(lexicon) = self.lexicon() else {
            return Sentiment::neutral();
        };

        let prefix: String = text.chars().take(SENTIMENT_PREFIX_CHARS).collect();
        let (score, tokens) = lexicon.score_text(&prefix);

        let label = match score {
            s if s > 0 => SentimentLabel::Positive,
            s if s < 0 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        };
        let confidence = if tokens == 0 {
            0.0
        } else {
            (score.unsigned_abs() as f32 / tokens as f32).min(1.0)
        };
        Sentiment {
            label,
            score: confidence,
        }
    }
}

impl Default for SentimentRuntime {
    fn default() -> Self {
        Self::new()
    }
}

struct Lexicon {
    weights: HashMap<String, i32>,
}

impl Lexicon {
    fn embedded() -> Result<Self, serde_json::Error> {
        let raw = include_str!("../sentiment_lexicon.json");
        Ok(Self {
            weights: serde_json::from_str(raw)?,
        })
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *self.weights.get(w).unwrap_or(&0)
    }

    /// Returns (score, token count). A negator within the preceding 1..=3
    /// tokens inverts the sign of a word's lexicon score.
    fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score = 0i32;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base != 0 {
                let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
                score += if negated { -base } else { base };
            }
        }

        (score, tokens.len())
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn" | "wasn" | "aren" | "won" | "cannot" | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_financial_text() {
        let rt = SentimentRuntime::new();
        let s = rt.classify("Shares surge after record quarterly profit and strong growth");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!(s.score > 0.0);
    }

    #[test]
    fn negative_financial_text() {
        let rt = SentimentRuntime::new();
        let s = rt.classify("Stock crashes amid fraud probe and heavy losses");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert!(s.score > 0.0);
    }

    #[test]
    fn neutral_when_nothing_matches() {
        let rt = SentimentRuntime::new();
        let s = rt.classify("The board will meet on Tuesday to review the agenda");
        assert_eq!(s.label, SentimentLabel::Neutral);
    }

    #[test]
    fn empty_text_is_neutral_with_zero_score() {
        let rt = SentimentRuntime::new();
        assert_eq!(rt.classify(""), Sentiment::neutral());
    }

    #[test]
    fn negation_flips_polarity() {
        let rt = SentimentRuntime::new();
        let s = rt.classify("The company did not report a loss this quarter");
        assert_eq!(s.label, SentimentLabel::Positive);
    }

    #[test]
    fn text_beyond_prefix_cap_is_ignored() {
        let rt = SentimentRuntime::new();
        // Padding past the cap, then a strongly negative tail that must not count.
        let mut text = "profit ".to_string();
        text.push_str(&"x ".repeat(SENTIMENT_PREFIX_CHARS));
        text.push_str("crash fraud collapse bankruptcy");
        let s = rt.classify(&text);
        assert_eq!(s.label, SentimentLabel::Positive);
    }

    #[test]
    fn first_use_is_race_safe() {
        let rt = std::sync::Arc::new(SentimentRuntime::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rt = rt.clone();
                std::thread::spawn(move || rt.classify("shares surge on strong profit").label)
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), SentimentLabel::Positive);
        }
    }
}
