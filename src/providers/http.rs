use crate::core::cache::Cache;
use crate::core::holdings::IndexSnapshot;
use crate::core::snapshot::{HistoryProvider, SnapshotProvider};
use crate::providers::util::fetch_json;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

const RETRIES: usize = 2;

fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("idxalloc/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Latest snapshot published as a JSON document at `url`.
pub struct HttpSnapshotProvider {
    url: String,
    cache: Arc<Cache<String, IndexSnapshot>>,
}

impl HttpSnapshotProvider {
    pub fn new(url: &str, cache: Arc<Cache<String, IndexSnapshot>>) -> Self {
        HttpSnapshotProvider {
            url: url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl SnapshotProvider for HttpSnapshotProvider {
    #[instrument(name = "SnapshotFetch", skip(self), fields(url = %self.url))]
    async fn fetch_snapshot(&self) -> Result<IndexSnapshot> {
        if let Some(cached) = self.cache.get(&self.url).await {
            return Ok(cached);
        }

        let snapshot: IndexSnapshot = fetch_json(&client()?, &self.url, RETRIES).await?;
        debug!(
            holdings = snapshot.holdings.len(),
            as_of = %snapshot.as_of_close,
            "Fetched snapshot"
        );

        self.cache.put(self.url.clone(), snapshot.clone()).await;
        Ok(snapshot)
    }
}

/// History published as `<base_url>/index.json` plus one `<base_url>/<date>.json` per date.
pub struct HttpHistoryProvider {
    base_url: String,
    cache: Arc<Cache<String, IndexSnapshot>>,
}

impl HttpHistoryProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, IndexSnapshot>>) -> Self {
        HttpHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }
}

#[async_trait]
impl HistoryProvider for HttpHistoryProvider {
    async fn load_index(&self) -> Result<Vec<String>> {
        let url = format!("{}/index.json", self.base_url);
        fetch_json(&client()?, &url, RETRIES).await
    }

    #[instrument(name = "HistoryFetch", skip(self))]
    async fn load_snapshot(&self, date: &str) -> Result<IndexSnapshot> {
        let url = format!("{}/{}.json", self.base_url, date);
        if let Some(cached) = self.cache.get(&url).await {
            return Ok(cached);
        }

        let snapshot: IndexSnapshot = fetch_json(&client()?, &url, RETRIES).await?;
        self.cache.put(url, snapshot.clone()).await;
        Ok(snapshot)
    }
}
