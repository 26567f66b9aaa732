//! Structured article summarization through the news-context oracle.
//!
//! One templated prompt extracts metadata fields and a short narrative in a
//! single call. The oracle is best-effort: any failure yields an explanatory
//! placeholder string, never an error.

use std::sync::Arc;
use tracing::warn;

use crate::oracle::Oracle;

/// Fixed multi-field extraction template for the on-demand path. `{text}` is
/// replaced with the (truncated) article body.
pub const SUMMARY_TEMPLATE: &str = "Extract metadata and summarize this financial article:
Format:
Company Name: [Extract]
Sector: [Extract]
Incident Type: [Classify]

Key Insights (AI Generated):
[3-sentence summary]

Article Content:
{text}
";

/// Article characters forwarded to the oracle; the rest is dropped to stay
/// inside the model's context window.
const MAX_INPUT_CHARS: usize = 12_000;

pub struct Summarizer {
    oracle: Arc<dyn Oracle>,
}

impl Summarizer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    pub async fn summarize(&self, text: &str, template: &str) -> String {
        let capped: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let prompt = template.replace("{text}", &capped);

        match self.oracle.generate(&prompt).await {
            Ok(out) if !out.trim().is_empty() => out.trim().to_string(),
            Ok(_) => "Summary unavailable: the model returned no content.".to_string(),
            Err(e) => {
                warn!(error = ?e, context = self.oracle.context_name(), "summarization failed");
                format!("Summary unavailable: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MockOracle;
    use anyhow::bail;
    use async_trait::async_trait;

    struct FailingOracle;

    #[async_trait]
    impl Oracle for FailingOracle {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            bail!("quota exhausted")
        }
        fn context_name(&self) -> &'static str {
            "failing"
        }
    }

    struct EchoOracle;

    #[async_trait]
    impl Oracle for EchoOracle {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            Ok(prompt.to_string())
        }
        fn context_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn returns_model_output_trimmed() {
        let s = Summarizer::new(Arc::new(MockOracle {
            fixed: "\nCompany Name: Infosys\nSector: IT\n".to_string(),
        }));
        let out = s.summarize("Infosys reported results.", SUMMARY_TEMPLATE).await;
        assert_eq!(out, "Company Name: Infosys\nSector: IT");
    }

    #[tokio::test]
    async fn oracle_failure_yields_placeholder() {
        let s = Summarizer::new(Arc::new(FailingOracle));
        let out = s.summarize("Some article.", SUMMARY_TEMPLATE).await;
        assert!(out.starts_with("Summary unavailable:"), "got: {out}");
    }

    #[tokio::test]
    async fn template_receives_article_text() {
        let s = Summarizer::new(Arc::new(EchoOracle));
        let out = s.summarize("UNIQUE-ARTICLE-BODY", SUMMARY_TEMPLATE).await;
        assert!(out.contains("UNIQUE-ARTICLE-BODY"));
        assert!(out.contains("Company Name: [Extract]"));
        assert!(!out.contains("{text}"));
    }

    #[tokio::test]
    async fn input_is_truncated_to_context_window() {
        let s = Summarizer::new(Arc::new(EchoOracle));
        let long = "a".repeat(MAX_INPUT_CHARS + 500);
        let out = s.summarize(&long, "{text}").await;
        assert_eq!(out.len(), MAX_INPUT_CHARS);
    }
}
