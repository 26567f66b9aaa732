//! Content resolution: cache-first article text lookup.
//!
//! The backlog doubles as the content cache, keyed on `link`. A hit is
//! returned without touching the network; a miss goes to the scraper and the
//! result is opportunistically written back so the next caller hits the
//! cache. Write-back is best-effort: a persistence fault is logged and the
//! freshly fetched content is still returned.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::scrape::{Scraper, EXTRACTION_FAILED};
use crate::store::BacklogStore;

pub struct ContentResolver {
    store: Arc<dyn BacklogStore>,
    scraper: Arc<dyn Scraper>,
}

impl ContentResolver {
    pub fn new(store: Arc<dyn BacklogStore>, scraper: Arc<dyn Scraper>) -> Self {
        Self { store, scraper }
    }

    /// Full article text for `link`, or `None` when neither the cache nor a
    /// live scrape can produce it.
    pub async fn resolve(&self, link: &str) -> Option<String> {
        match self.store.load() {
            Ok(records) => {
                let cached = records
                    .iter()
                    .find(|r| r.link == link)
                    .and_then(|r| r.full_content.clone())
                    .filter(|c| !c.is_empty());
                if let Some(content) = cached {
                    debug!(link, "content cache hit");
                    return Some(content);
                }
            }
            Err(e) => warn!(error = ?e, "backlog scan failed; falling back to live fetch"),
        }

        let fetched = match self.scraper.scrape_article_content(link).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = ?e, link, "article scrape failed");
                return None;
            }
        };
        if fetched.is_empty() || fetched == EXTRACTION_FAILED {
            return None;
        }

        self.write_back(link, &fetched);
        Some(fetched)
    }

    fn write_back(&self, link: &str, content: &str) {
        let result = self.store.load().and_then(|mut records| {
            match records.iter_mut().find(|r| r.link == link) {
                Some(rec) => {
                    rec.full_content = Some(content.to_string());
                    self.store.save(&records)
                }
                // No matching backlog record: nothing to fill.
                None => Ok(()),
            }
        });
        if let Err(e) = result {
            warn!(error = ?e, link, "content cache write-back failed");
        }
    }
}
