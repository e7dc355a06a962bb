#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use vortex_backend::error::{AppError, AppResult, SinkError};
use vortex_backend::models::*;
use vortex_backend::services::{EventSink, SnapshotSource};

/// Snapshot builder for a fixed Arsenal v Chelsea fixture
pub fn arsenal_chelsea(id: &str) -> MatchSnapshot {
    MatchSnapshot::new(id, "Arsenal", "Chelsea")
}

pub fn live(id: &str, home: u32, away: u32, status: &str) -> MatchRecord {
    MatchRecord::from(
        arsenal_chelsea(id)
            .with_score(home, away)
            .with_status(MatchStatus::from_code(status)),
    )
}

/// Sink that remembers everything it was given
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<DomainEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(DomainEvent::kind_str).collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Sink that rejects every delivery, counting attempts
#[derive(Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, _event: &DomainEvent) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Api {
            status: 429,
            body: "Too Many Requests: retry after 30".to_string(),
        })
    }
}

/// Source whose store is down
pub struct UnavailableSource;

#[async_trait]
impl SnapshotSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn fetch_batch(&self) -> AppResult<Vec<MatchRecord>> {
        Err(AppError::Source("store offline".to_string()))
    }
}
