pub mod feed_listener;
pub mod match_watcher;
pub mod messages;
pub mod notifier;
pub mod snapshot_source;
pub mod telegram;

pub use feed_listener::{ChangeFeedListener, MATCHES_CHANNEL};
pub use match_watcher::{CycleReport, MatchWatcher};
pub use messages::render_event;
pub use notifier::{DispatchReport, EventSink, Notifier};
pub use snapshot_source::{SnapshotSource, StaticSource, StoreSource};
pub use telegram::TelegramSink;
