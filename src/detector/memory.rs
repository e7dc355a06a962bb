use std::collections::{HashMap, HashSet};

/// Comparison fields remembered for one match between cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// "home-away", e.g. "2-1"
    pub last_score_key: String,
    /// Upper-case status code
    pub last_status_key: String,
}

impl MemoryEntry {
    pub fn new(last_score_key: String, last_status_key: String) -> Self {
        Self {
            last_score_key,
            last_status_key,
        }
    }

    /// Split the remembered score key back into (home, away).
    ///
    /// `None` means the entry is corrupt and must be re-seeded.
    pub fn parse_score(&self) -> Option<(u32, u32)> {
        let (home, away) = self.last_score_key.split_once('-')?;
        Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
    }
}

/// De-duplication key for last-event markers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub match_id: String,
    pub event_time: i64,
}

impl EventKey {
    pub fn new(match_id: &str, event_time: i64) -> Self {
        Self {
            match_id: match_id.to_string(),
            event_time,
        }
    }
}

/// Process-local record of what the detector last saw for every match.
///
/// Entries are never evicted and nothing here is persisted; a restart starts empty.
#[derive(Debug, Default)]
pub struct ObservationMemory {
    entries: HashMap<String, MemoryEntry>,
    seen_event_keys: HashSet<EventKey>,
}

impl ObservationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, match_id: &str) -> Option<&MemoryEntry> {
        self.entries.get(match_id)
    }

    pub(crate) fn get_mut(&mut self, match_id: &str) -> Option<&mut MemoryEntry> {
        self.entries.get_mut(match_id)
    }

    pub(crate) fn seed(&mut self, match_id: &str, entry: MemoryEntry) {
        self.entries.insert(match_id.to_string(), entry);
    }

    /// Number of matches tracked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark an event key as seen. Returns `true` if it was new.
    pub(crate) fn mark_seen(&mut self, key: EventKey) -> bool {
        self.seen_event_keys.insert(key)
    }

    #[cfg(test)]
    pub(crate) fn seen_event_count(&self) -> usize {
        self.seen_event_keys.len()
    }
}
