//! Environment-driven configuration, resolved once at startup.
//!
//! Two oracle credential contexts exist: "chat" (`GEMINI_API_KEY`) and
//! "news" (`GEMINI_NEWS_API_KEY`, falling back to the chat key). Each
//! context becomes its own client value; nothing is routed through shared
//! mutable configuration. Absence of the required chat key is the one hard
//! startup failure in the crate.

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::oracle::GeminiClient;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BACKLOG_PATH: &str = "news_backlog.json";
const DEFAULT_PACE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct OracleConfig {
    chat_key: String,
    news_key: String,
    model: String,
}

impl OracleConfig {
    pub fn from_env() -> Result<Self> {
        let chat_key =
            env::var("GEMINI_API_KEY").map_err(|_| anyhow!("Missing GEMINI_API_KEY env var"))?;
        let news_key = env::var("GEMINI_NEWS_API_KEY").unwrap_or_else(|_| chat_key.clone());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            chat_key,
            news_key,
            model,
        })
    }

    pub fn chat_client(&self) -> GeminiClient {
        GeminiClient::new(self.chat_key.clone(), self.model.clone(), "chat")
    }

    pub fn news_client(&self) -> GeminiClient {
        GeminiClient::new(self.news_key.clone(), self.model.clone(), "news")
    }

    pub fn news_key_is_dedicated(&self) -> bool {
        self.news_key != self.chat_key
    }
}

#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub backlog_path: PathBuf,
    /// Inter-record delay of the batch pass (rate-limit floor).
    pub pace: Duration,
}

impl EnricherConfig {
    pub fn from_env() -> Self {
        let backlog_path = env::var("NEWS_BACKLOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BACKLOG_PATH));
        let pace_ms = env::var("ENRICH_PACE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PACE_MS);
        Self {
            backlog_path,
            pace: Duration::from_millis(pace_ms),
        }
    }
}
