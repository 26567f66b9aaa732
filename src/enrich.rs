//! Enrichment orchestrator.
//!
//! Two independent entry points over the same collaborators: the batch pass
//! (entity extraction + market impact over the whole backlog, idempotent and
//! checkpointed) and the on-demand pass (content resolution + sentiment +
//! summary for a single link). All collaborators are injected once from the
//! composition root.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::content::ContentResolver;
use crate::extract::EntityExtractor;
use crate::impact::ImpactCalculator;
use crate::record::BatchState;
use crate::scrape::Scraper;
use crate::sentiment::SentimentRuntime;
use crate::store::BacklogStore;
use crate::summarize::{Summarizer, SUMMARY_TEMPLATE};

/// Full-backlog persistence happens every this many processed records, so a
/// crash loses at most the tail of the current stride.
pub const CHECKPOINT_EVERY: usize = 5;

/// On-demand failure payload summary text.
pub const UNAVAILABLE_SUMMARY: &str = "Failed to fetch article content.";

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("enrich_processed_total", "Records enriched by the batch pass.");
        describe_counter!("enrich_skipped_total", "Records skipped as already processed.");
        describe_counter!("enrich_checkpoints_total", "Periodic backlog checkpoints written.");
        describe_counter!(
            "impact_lookup_failures_total",
            "Price-history lookups that failed and degraded to null impact."
        );
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
}

/// Combined on-demand result for one article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleEnrichment {
    pub summary: String,
    pub sentiment: String,
}

impl ArticleEnrichment {
    fn unavailable() -> Self {
        Self {
            summary: UNAVAILABLE_SUMMARY.to_string(),
            sentiment: "neutral".to_string(),
        }
    }
}

pub struct Enricher {
    store: Arc<dyn BacklogStore>,
    scraper: Arc<dyn Scraper>,
    extractor: EntityExtractor,
    impact: ImpactCalculator,
    resolver: ContentResolver,
    sentiment: Arc<SentimentRuntime>,
    summarizer: Summarizer,
    pace: Duration,
}

impl Enricher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn BacklogStore>,
        scraper: Arc<dyn Scraper>,
        extractor: EntityExtractor,
        impact: ImpactCalculator,
        sentiment: Arc<SentimentRuntime>,
        summarizer: Summarizer,
        pace: Duration,
    ) -> Self {
        let resolver = ContentResolver::new(store.clone(), scraper.clone());
        Self {
            store,
            scraper,
            extractor,
            impact,
            resolver,
            sentiment,
            summarizer,
            pace,
        }
    }

    /// One sequential pass over the whole backlog. Already-processed records
    /// are skipped untouched; everything else is extracted, impact-measured,
    /// and marked processed (a missing ticker or a failed lookup both settle
    /// as a null impact). The backlog is checkpointed every
    /// [`CHECKPOINT_EVERY`] processed records and once at the end.
    pub async fn run_batch(&self) -> anyhow::Result<BatchReport> {
        ensure_metrics_described();

        let mut records = self.store.load()?;
        info!(total = records.len(), "starting batch enrichment pass");

        let mut report = BatchReport::default();
        for i in 0..records.len() {
            if records[i].is_batch_processed() {
                report.skipped += 1;
                counter!("enrich_skipped_total").increment(1);
                continue;
            }

            let headline = records[i].headline.clone();
            info!(headline = %truncate(&headline, 50), "analyzing");

            let extraction = self.extractor.extract(&headline).await;
            let impact = match extraction.ticker.as_deref() {
                Some(ticker) => {
                    info!(ticker, question = ?extraction.question, "ticker identified");
                    self.impact.compute(ticker, records[i].timestamp).await
                }
                None => None,
            };

            records[i].suggested_question = extraction.question;
            records[i].state = BatchState::Processed {
                ticker: extraction.ticker,
                impact,
            };
            report.processed += 1;
            counter!("enrich_processed_total").increment(1);

            // Rate-limit floor between oracle calls.
            tokio::time::sleep(self.pace).await;

            if report.processed % CHECKPOINT_EVERY == 0 {
                self.store.save(&records)?;
                counter!("enrich_checkpoints_total").increment(1);
            }
        }

        self.store.save(&records)?;
        info!(
            processed = report.processed,
            skipped = report.skipped,
            "batch enrichment pass complete"
        );
        Ok(report)
    }

    /// Resolve, classify, and summarize a single article. When content cannot
    /// be resolved at all, the fixed failure payload is returned without
    /// invoking the model stages.
    pub async fn enrich_one(&self, link: &str) -> ArticleEnrichment {
        let Some(content) = self.resolver.resolve(link).await else {
            return ArticleEnrichment::unavailable();
        };

        let sentiment = self.sentiment.classify(&content);
        let summary = self.summarizer.summarize(&content, SUMMARY_TEMPLATE).await;

        ArticleEnrichment {
            summary,
            sentiment: sentiment.label.as_str().to_string(),
        }
    }

    /// Merge the scraper's latest feed into the backlog, deduplicating on
    /// `link`. The feed is most-recent-first and the backlog keeps that
    /// convention, so unseen records are prepended in feed order.
    pub async fn sync_latest(&self) -> anyhow::Result<usize> {
        let fresh = self.scraper.get_latest_news().await?;
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut records = self.store.load()?;
        let known: HashSet<String> = records.iter().map(|r| r.link.clone()).collect();

        let unseen: Vec<_> = fresh
            .into_iter()
            .filter(|r| !known.contains(&r.link))
            .collect();
        if unseen.is_empty() {
            return Ok(0);
        }

        let added = unseen.len();
        records.splice(0..0, unseen);
        if let Err(e) = self.store.save(&records) {
            warn!(error = ?e, "failed to persist synced backlog");
            return Err(e);
        }
        info!(added, "synced latest records into backlog");
        Ok(added)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
