use crate::error::AppResult;
use crate::models::MatchRecord;
use crate::repositories::MatchRepository;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Supplies the current batch of match records, once per cycle
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Fetch the records that make up "current truth" for this cycle
    async fn fetch_batch(&self) -> AppResult<Vec<MatchRecord>>;
}

/// Pulls today's fixtures (and anything still in play) from the match store
pub struct StoreSource {
    repo: Arc<MatchRepository>,
    window: ChronoDuration,
}

impl StoreSource {
    pub fn new(repo: Arc<MatchRepository>) -> Self {
        Self {
            repo,
            window: ChronoDuration::hours(24),
        }
    }
}

#[async_trait]
impl SnapshotSource for StoreSource {
    fn name(&self) -> &str {
        "match-store"
    }

    async fn fetch_batch(&self) -> AppResult<Vec<MatchRecord>> {
        let now = Utc::now();
        let records = self
            .repo
            .find_live_matches(now - self.window, now + self.window)
            .await?;
        Ok(records)
    }
}

/// Replays queued batches in order, then keeps returning the last one.
///
/// Useful for dry runs and tests where the store is not available.
pub struct StaticSource {
    batches: Mutex<VecDeque<Vec<MatchRecord>>>,
    last: Mutex<Vec<MatchRecord>>,
}

impl StaticSource {
    pub fn new(batches: Vec<Vec<MatchRecord>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            last: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SnapshotSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_batch(&self) -> AppResult<Vec<MatchRecord>> {
        let next = self.batches.lock().await.pop_front();
        let mut last = self.last.lock().await;
        if let Some(batch) = next {
            *last = batch;
        }
        Ok(last.clone())
    }
}
