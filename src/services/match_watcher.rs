use crate::detector::{ChangeDetector, CycleSummary, DetectorConfig};
use crate::error::AppResult;
use crate::models::{DomainEvent, MatchRecord};
use crate::services::notifier::Notifier;
use crate::services::snapshot_source::SnapshotSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Result of one observation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub summary: CycleSummary,
    pub events: Vec<DomainEvent>,
    pub delivered: usize,
    pub failed: usize,
}

/// Drives observation cycles: takes a batch, runs the change detector over it and
/// hands the resulting events to the notifier.
///
/// Polling and the change feed both end up in [`MatchWatcher::process_batch`].
pub struct MatchWatcher {
    source: Arc<dyn SnapshotSource>,
    detector: Mutex<ChangeDetector>,
    notifier: Notifier,
    poll_interval: Duration,
}

impl MatchWatcher {
    /// Create a new match watcher
    pub fn new(source: Arc<dyn SnapshotSource>, notifier: Notifier, config: DetectorConfig) -> Self {
        Self {
            source,
            detector: Mutex::new(ChangeDetector::new(config)),
            notifier,
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Set poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Number of matches the detector currently remembers
    pub async fn tracked_matches(&self) -> usize {
        self.detector.lock().await.tracked_matches()
    }

    /// Poll the snapshot source on a fixed interval, forever
    pub async fn start(self) {
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Match watcher started, polling {} every {:?}",
            self.source.name(),
            self.poll_interval
        );

        loop {
            interval.tick().await;

            if let Err(e) = self.poll_once().await {
                error!("Error polling {}: {}", self.source.name(), e);
            }
        }
    }

    /// Process batches pushed by a change feed until the sender side closes
    pub async fn start_feed(self, mut batches: mpsc::Receiver<Vec<MatchRecord>>) {
        info!("Match watcher started in feed mode");

        while let Some(batch) = batches.recv().await {
            self.process_batch(batch).await;
        }

        info!("Change feed closed, match watcher stopping");
    }

    /// Fetch one batch from the source and process it
    pub async fn poll_once(&self) -> AppResult<CycleReport> {
        let batch = self.source.fetch_batch().await?;
        Ok(self.process_batch(batch).await)
    }

    /// Run one cycle over `batch` and dispatch whatever it produced.
    ///
    /// Detection holds the detector lock, so overlapping calls are serialized and each
    /// cycle sees the memory left by the previous one. Dispatch runs after the lock is
    /// released, in emission order.
    pub async fn process_batch(&self, batch: Vec<MatchRecord>) -> CycleReport {
        let (events, summary) = {
            let mut detector = self.detector.lock().await;
            let mut cycle = detector.observe(batch);
            let events: Vec<DomainEvent> = cycle.by_ref().collect();
            (events, cycle.summary())
        };

        let mut report = CycleReport {
            summary,
            ..Default::default()
        };

        for event in &events {
            let dispatch = self.notifier.dispatch(event).await;
            report.delivered += dispatch.delivered;
            report.failed += dispatch.failed;
        }

        debug!(
            "Cycle {}: {} matches, {} skipped, {} events ({} delivered, {} failed)",
            summary.cycle,
            summary.processed,
            summary.skipped,
            events.len(),
            report.delivered,
            report.failed
        );

        report.events = events;
        report
    }
}
