// tests/sync_latest.rs
// Feed-to-backlog merge: dedup by link, prepend unseen records in feed order.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketpulse_enricher::enrich::Enricher;
use marketpulse_enricher::extract::EntityExtractor;
use marketpulse_enricher::impact::{DailySession, ImpactCalculator, PriceSource};
use marketpulse_enricher::oracle::MockOracle;
use marketpulse_enricher::record::{timestamp_format, NewsRecord};
use marketpulse_enricher::scrape::Scraper;
use marketpulse_enricher::sentiment::SentimentRuntime;
use marketpulse_enricher::store::BacklogStore;
use marketpulse_enricher::summarize::Summarizer;

struct MemoryStore {
    records: Mutex<Vec<NewsRecord>>,
}

impl BacklogStore for MemoryStore {
    fn load(&self) -> Result<Vec<NewsRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    fn save(&self, records: &[NewsRecord]) -> Result<()> {
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

struct FeedScraper {
    feed: Vec<NewsRecord>,
}

#[async_trait]
impl Scraper for FeedScraper {
    async fn get_latest_news(&self) -> Result<Vec<NewsRecord>> {
        Ok(self.feed.clone())
    }

    async fn scrape_article_content(&self, _link: &str) -> Result<String> {
        Ok(String::new())
    }
}

struct NoSource;

#[async_trait]
impl PriceSource for NoSource {
    async fn history(
        &self,
        _symbol: &str,
        _start: chrono::NaiveDate,
        _end: chrono::NaiveDate,
    ) -> Result<Vec<DailySession>> {
        Ok(Vec::new())
    }
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, timestamp_format::FORMAT).unwrap()
}

fn record(link: &str) -> NewsRecord {
    NewsRecord::new("Some headline", ts("2024-03-15 10:00:00"), link)
}

fn enricher(store: Arc<MemoryStore>, feed: Vec<NewsRecord>) -> Enricher {
    let oracle = Arc::new(MockOracle { fixed: "{}".to_string() });
    Enricher::new(
        store,
        Arc::new(FeedScraper { feed }),
        EntityExtractor::new(oracle.clone()),
        ImpactCalculator::new(Arc::new(NoSource)),
        Arc::new(SentimentRuntime::new()),
        Summarizer::new(oracle),
        Duration::ZERO,
    )
}

#[tokio::test]
async fn unseen_records_are_prepended_in_feed_order() {
    let store = Arc::new(MemoryStore {
        records: Mutex::new(vec![record("https://news.example/old")]),
    });
    let feed = vec![
        record("https://news.example/newest"),
        record("https://news.example/newer"),
    ];
    let e = enricher(store.clone(), feed);

    let added = e.sync_latest().await.unwrap();
    assert_eq!(added, 2);

    let links: Vec<_> = store
        .load()
        .unwrap()
        .into_iter()
        .map(|r| r.link)
        .collect();
    assert_eq!(
        links,
        vec![
            "https://news.example/newest",
            "https://news.example/newer",
            "https://news.example/old",
        ]
    );
}

#[tokio::test]
async fn known_links_are_not_duplicated() {
    let store = Arc::new(MemoryStore {
        records: Mutex::new(vec![record("https://news.example/old")]),
    });
    let feed = vec![
        record("https://news.example/old"),
        record("https://news.example/new"),
    ];
    let e = enricher(store.clone(), feed);

    let added = e.sync_latest().await.unwrap();
    assert_eq!(added, 1);
    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_feed_is_a_no_op() {
    let store = Arc::new(MemoryStore {
        records: Mutex::new(vec![record("https://news.example/old")]),
    });
    let e = enricher(store.clone(), Vec::new());

    let added = e.sync_latest().await.unwrap();
    assert_eq!(added, 0);
    assert_eq!(store.load().unwrap().len(), 1);
}
