//! Change detection over successive match snapshots.

pub mod change_detector;
pub mod memory;

pub use change_detector::{ChangeDetector, CycleEvents, CycleSummary, DetectorConfig};
pub use memory::{EventKey, MemoryEntry, ObservationMemory};
