use crate::error::SinkError;
use crate::models::DomainEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Renders and delivers one domain event (chat message, web push, ...)
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError>;
}

/// Outcome of dispatching one event to every sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans domain events out to the configured sinks.
///
/// Delivery is best-effort and at-most-once: a failure is logged and the event is
/// not retried.
#[derive(Clone, Default)]
pub struct Notifier {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name().to_string()).collect()
    }

    /// Deliver one event to every sink, in registration order
    pub async fn dispatch(&self, event: &DomainEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        info!("📣 {} for match {}", event.kind_str(), event.match_id());

        for sink in &self.sinks {
            match sink.deliver(event).await {
                Ok(()) => {
                    debug!("Delivered {} via {}", event.kind_str(), sink.name());
                    report.delivered += 1;
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        "{} rate limited, dropping {} for match {}: {}",
                        sink.name(),
                        event.kind_str(),
                        event.match_id(),
                        e
                    );
                    report.failed += 1;
                }
                Err(e) => {
                    warn!(
                        "Failed to deliver {} for match {} via {}: {}",
                        event.kind_str(),
                        event.match_id(),
                        sink.name(),
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}
