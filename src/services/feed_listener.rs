use crate::error::{AppError, AppResult};
use crate::models::MatchRecord;
use crate::services::snapshot_source::SnapshotSource;
use futures::{Stream, StreamExt};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error, info};

/// Channel the `matches` trigger notifies on
pub const MATCHES_CHANNEL: &str = "matches_changed";

/// Push-style trigger: waits for `NOTIFY matches_changed`, re-reads the live batch
/// and pushes it to the watcher.
///
/// A bulk write fires one notification per row; anything that arrives within
/// `debounce` of the previous notification is folded into the same fetch.
/// If the listener connection drops it reconnects after `retry_delay`.
pub struct ChangeFeedListener {
    pool: PgPool,
    source: Arc<dyn SnapshotSource>,
    channel: String,
    retry_delay: Duration,
    debounce: Duration,
}

impl ChangeFeedListener {
    pub fn new(pool: PgPool, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            pool,
            source,
            channel: MATCHES_CHANNEL.to_string(),
            retry_delay: Duration::from_secs(5),
            debounce: Duration::from_millis(250),
        }
    }

    /// Set the delay before reconnecting after a listener failure
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the quiet period that ends a burst of notifications
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run until the receiving watcher goes away
    pub async fn run(self, batches: mpsc::Sender<Vec<MatchRecord>>) {
        loop {
            match self.listen(&batches).await {
                Ok(()) => {
                    info!("Watcher closed the feed, stopping listener on {}", self.channel);
                    return;
                }
                Err(e) => {
                    error!(
                        "Change feed listener failed: {}. Retrying in {:?}",
                        e, self.retry_delay
                    );
                    time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// One listener session. `Ok(())` means the receiver was dropped.
    async fn listen(&self, batches: &mpsc::Sender<Vec<MatchRecord>>) -> AppResult<()> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(&self.channel).await?;
        info!("Listening for changes on {}", self.channel);

        // Seed straight away rather than waiting for the first write
        if batches.send(self.source.fetch_batch().await?).await.is_err() {
            return Ok(());
        }

        let mut notifications = listener.into_stream();
        loop {
            let notification = notifications
                .next()
                .await
                .ok_or_else(|| AppError::Source(format!("{} listener closed", self.channel)))??;
            let folded = drain_burst(&mut notifications, self.debounce).await?;
            debug!(
                "Change notification for fixture {} (+{} folded)",
                notification.payload(),
                folded
            );

            let batch = self.source.fetch_batch().await?;
            if batches.send(batch).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// Consume items until the stream stays quiet for `window`. Returns how many were drained.
pub(crate) async fn drain_burst<S, T, E>(stream: &mut S, window: Duration) -> Result<usize, E>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    let mut drained = 0;
    loop {
        match time::timeout(window, stream.next()).await {
            Ok(Some(item)) => {
                item?;
                drained += 1;
            }
            Ok(None) | Err(_) => return Ok(drained),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc::unbounded;

    #[tokio::test]
    async fn test_drain_burst_folds_queued_notifications() {
        let (tx, mut rx) = unbounded::<Result<&str, String>>();
        for id in ["1", "2", "3"] {
            tx.unbounded_send(Ok(id)).unwrap();
        }

        let drained = drain_burst(&mut rx, Duration::from_millis(20)).await;
        assert_eq!(drained, Ok(3));

        // Nothing queued: the quiet window elapses straight away
        assert_eq!(drain_burst(&mut rx, Duration::from_millis(20)).await, Ok(0));
    }

    #[tokio::test]
    async fn test_drain_burst_surfaces_listener_errors() {
        let (tx, mut rx) = unbounded::<Result<&str, String>>();
        tx.unbounded_send(Ok("1")).unwrap();
        tx.unbounded_send(Err("connection reset".to_string())).unwrap();

        let result = drain_burst(&mut rx, Duration::from_millis(20)).await;
        assert_eq!(result, Err("connection reset".to_string()));
    }
}
