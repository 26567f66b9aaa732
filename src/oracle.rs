//! Generative-oracle seam: trait + Gemini client.
//!
//! The oracle is a best-effort text-in/text-out collaborator; callers own
//! prompt construction and defensive output parsing. Each credential context
//! ("chat" vs "news") is its own client value so concurrent calls under
//! different credentials never share mutable configuration.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// One prompt, one raw text completion.
    async fn generate(&self, prompt: &str) -> Result<String>;
    /// Credential context for diagnostics.
    fn context_name(&self) -> &'static str;
}

/// Gemini `generateContent` client bound to a single API key.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    context: &'static str,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, context: &'static str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("marketpulse-enricher/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
            context,
        }
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            candidates: Option<Vec<Candidate>>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        if self.api_key.is_empty() {
            bail!("no API key for {} oracle context", self.context);
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(context = self.context, model = %self.model, "oracle call");
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            bail!("oracle HTTP {status} in {} context", self.context);
        }

        let body: Resp = resp.json().await?;
        let text: String = body
            .candidates
            .and_then(|c| c.into_iter().next())
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| anyhow!("oracle returned no candidates"))?;

        if text.trim().is_empty() {
            bail!("oracle returned an empty candidate");
        }
        Ok(text)
    }

    fn context_name(&self) -> &'static str {
        self.context
    }
}

/// Fixed-output oracle for tests and local runs.
#[derive(Clone)]
pub struct MockOracle {
    pub fixed: String,
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.fixed.clone())
    }

    fn context_name(&self) -> &'static str {
        "mock"
    }
}

/// Strip markdown code-fence artifacts the oracle wraps around JSON output.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"ticker\": \"INFY.NS\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"ticker\": \"INFY.NS\"}");
    }

    #[test]
    fn strips_bare_fences() {
        let raw = "```\n{\"ticker\": null}\n```";
        assert_eq!(strip_code_fences(raw), "{\"ticker\": null}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
