//! Batch Enrichment Pass: Binary Entrypoint
//! Loads the backlog, runs entity extraction + market-impact measurement
//! over every unprocessed record, and persists the result with periodic
//! checkpoints.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketpulse_enricher::config::{EnricherConfig, OracleConfig};
use marketpulse_enricher::enrich::Enricher;
use marketpulse_enricher::extract::EntityExtractor;
use marketpulse_enricher::impact::ImpactCalculator;
use marketpulse_enricher::prices::YahooPriceSource;
use marketpulse_enricher::scrape::DisabledScraper;
use marketpulse_enricher::sentiment::SentimentRuntime;
use marketpulse_enricher::store::JsonStore;
use marketpulse_enricher::summarize::Summarizer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marketpulse_enricher=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Missing GEMINI_API_KEY aborts here; everything past this point
    // degrades per-record instead of failing the pass.
    let oracle_cfg = OracleConfig::from_env()?;
    let cfg = EnricherConfig::from_env();
    info!(
        backlog = %cfg.backlog_path.display(),
        dedicated_news_key = oracle_cfg.news_key_is_dedicated(),
        "initializing enrichment engine"
    );

    let store = Arc::new(JsonStore::new(&cfg.backlog_path));
    let extractor = EntityExtractor::new(Arc::new(oracle_cfg.chat_client()));
    let impact = ImpactCalculator::new(Arc::new(YahooPriceSource::new()));
    let sentiment = Arc::new(SentimentRuntime::new());
    let summarizer = Summarizer::new(Arc::new(oracle_cfg.news_client()));

    // The live listing scraper is an external collaborator; the batch pass
    // runs against whatever it has already appended to the backlog.
    let enricher = Enricher::new(
        store,
        Arc::new(DisabledScraper),
        extractor,
        impact,
        sentiment,
        summarizer,
        cfg.pace,
    );

    let report = enricher.run_batch().await?;
    info!(
        processed = report.processed,
        skipped = report.skipped,
        "analysis complete"
    );
    Ok(())
}
