//! Scraper boundary.
//!
//! The live web scraper is an external collaborator; this crate consumes it
//! through [`Scraper`]. Extraction failure is reported in-band via the
//! canonical sentinel string, never as an error, so ordinary fetch failures
//! stay on the recoverable path.

use anyhow::Result;
use async_trait::async_trait;

use crate::record::NewsRecord;

/// Canonical "extraction failed" sentinel returned by the scraper in place
/// of article text.
pub const EXTRACTION_FAILED: &str = "Could not extract article content.";

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Freshly scraped records, most-recent-first.
    async fn get_latest_news(&self) -> Result<Vec<NewsRecord>>;

    /// Full article text for a content locator. Returns the
    /// [`EXTRACTION_FAILED`] sentinel when the page yields no article body.
    async fn scrape_article_content(&self, link: &str) -> Result<String>;
}

/// Placeholder for compositions without a live scraper attached: empty feed,
/// sentinel content. The on-demand path degrades to its fixed failure
/// payload and the batch path is unaffected.
pub struct DisabledScraper;

#[async_trait]
impl Scraper for DisabledScraper {
    async fn get_latest_news(&self) -> Result<Vec<NewsRecord>> {
        Ok(Vec::new())
    }

    async fn scrape_article_content(&self, _link: &str) -> Result<String> {
        Ok(EXTRACTION_FAILED.to_string())
    }
}
