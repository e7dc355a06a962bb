//! Domain models for the Vortex backend.
//!
//! Raw match rows as they come out of the store, the typed snapshots the
//! change detector works on, and the domain events it emits.

pub mod domain_event;
pub mod match_record;
pub mod match_snapshot;

// Re-export all models for convenient access
pub use domain_event::{CardKind, DomainEvent, MatchRef};
pub use match_record::{MatchRecord, SnapshotError};
pub use match_snapshot::{EventMarker, LastEvent, MatchSnapshot, MatchStatus};
