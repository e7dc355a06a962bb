use crate::detector::memory::{EventKey, MemoryEntry, ObservationMemory};
use crate::models::{DomainEvent, MatchRecord, MatchRef, MatchSnapshot};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Detector options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Emit `SecondHalfStart` on a transition to `2H`
    pub notify_second_half: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            notify_second_half: true,
        }
    }
}

/// Counters for one observation cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    /// Records that converted cleanly and were diffed
    pub processed: usize,
    /// Malformed records dropped from the batch
    pub skipped: usize,
    pub emitted: usize,
}

/// Compares successive match snapshots and decides which domain events happened.
///
/// The detector exclusively owns its [`ObservationMemory`]; the only way to touch it
/// is through [`ChangeDetector::observe`].
#[derive(Debug, Default)]
pub struct ChangeDetector {
    memory: ObservationMemory,
    config: DetectorConfig,
    cycles: u64,
}

impl ChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            memory: ObservationMemory::new(),
            config,
            cycles: 0,
        }
    }

    /// Number of matches remembered so far
    pub fn tracked_matches(&self) -> usize {
        self.memory.len()
    }

    #[cfg(test)]
    pub(crate) fn memory(&self) -> &ObservationMemory {
        &self.memory
    }

    #[cfg(test)]
    pub(crate) fn memory_mut(&mut self) -> &mut ObservationMemory {
        &mut self.memory
    }

    /// Start a new cycle over `batch`.
    ///
    /// The returned iterator is lazy: each record is converted and diffed only when
    /// the caller pulls past the events of the previous one. Records left unpulled when
    /// the iterator is dropped are not observed, so callers should drain it.
    pub fn observe<I>(&mut self, batch: I) -> CycleEvents<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Into<MatchRecord>,
    {
        self.cycles += 1;
        let summary = CycleSummary {
            cycle: self.cycles,
            ..Default::default()
        };
        CycleEvents {
            detector: self,
            records: batch.into_iter(),
            pending: VecDeque::new(),
            summary,
        }
    }

    /// Diff one snapshot against memory, pushing any events onto `out`
    fn diff(&mut self, snapshot: &MatchSnapshot, out: &mut VecDeque<DomainEvent>) {
        let score_key = snapshot.score_key();
        let status_key = snapshot.status_key();

        let previous_score = match self.memory.get(&snapshot.id).map(MemoryEntry::parse_score) {
            None => {
                debug!("First sight of match {}, seeding memory", snapshot.id);
                self.seed(snapshot);
                return;
            }
            Some(None) => {
                warn!(
                    "Corrupted memory for match {} (score key {:?}), re-seeding",
                    snapshot.id,
                    self.memory.get(&snapshot.id).map(|e| e.last_score_key.as_str())
                );
                self.seed(snapshot);
                return;
            }
            Some(Some(score)) => score,
        };

        let Some(entry) = self.memory.get_mut(&snapshot.id) else {
            return;
        };

        if score_key != entry.last_score_key {
            let (old_home, old_away) = previous_score;
            let is_reversal = snapshot.home_score < old_home || snapshot.away_score < old_away;
            out.push_back(DomainEvent::Goal {
                fixture: MatchRef::from(snapshot),
                home_score: snapshot.home_score,
                away_score: snapshot.away_score,
                elapsed: snapshot.elapsed,
                is_reversal,
            });
            entry.last_score_key = score_key;
        }

        if status_key != entry.last_status_key {
            if let Some(event) = status_event(&self.config, &status_key, snapshot) {
                out.push_back(event);
            }
            entry.last_status_key = status_key;
        }

        if let Some(last_event) = &snapshot.last_event {
            if self.memory.mark_seen(EventKey::new(&snapshot.id, last_event.time)) {
                out.push_back(DomainEvent::CardEvent {
                    fixture: MatchRef::from(snapshot),
                    team: last_event.team.clone(),
                    kind: last_event.marker.into(),
                    elapsed: snapshot.elapsed,
                });
            }
        }
    }

    fn seed(&mut self, snapshot: &MatchSnapshot) {
        self.memory.seed(
            &snapshot.id,
            MemoryEntry::new(snapshot.score_key(), snapshot.status_key()),
        );
        if let Some(last_event) = &snapshot.last_event {
            self.memory.mark_seen(EventKey::new(&snapshot.id, last_event.time));
        }
    }
}

/// Status transition table: at most one event per transition
fn status_event(config: &DetectorConfig, status_key: &str, snapshot: &MatchSnapshot) -> Option<DomainEvent> {
    let fixture = MatchRef::from(snapshot);
    match status_key {
        "1H" | "LIVE" => Some(DomainEvent::KickOff { fixture }),
        "HT" => Some(DomainEvent::HalfTime { fixture }),
        "2H" if config.notify_second_half => Some(DomainEvent::SecondHalfStart { fixture }),
        "FT" => Some(DomainEvent::FullTime {
            fixture,
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
        }),
        _ => None,
    }
}

/// Events of one cycle, produced on demand. Not restartable.
pub struct CycleEvents<'a, I> {
    detector: &'a mut ChangeDetector,
    records: I,
    pending: VecDeque<DomainEvent>,
    summary: CycleSummary,
}

impl<'a, I> CycleEvents<'a, I> {
    /// Counters so far; final once the iterator has returned `None`
    pub fn summary(&self) -> CycleSummary {
        self.summary
    }
}

impl<'a, I> Iterator for CycleEvents<'a, I>
where
    I: Iterator,
    I::Item: Into<MatchRecord>,
{
    type Item = DomainEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                self.summary.emitted += 1;
                return Some(event);
            }

            let record: MatchRecord = self.records.next()?.into();
            match MatchSnapshot::try_from(record) {
                Ok(snapshot) => {
                    self.summary.processed += 1;
                    self.detector.diff(&snapshot, &mut self.pending);
                }
                Err(e) => {
                    self.summary.skipped += 1;
                    warn!("Skipping record in cycle {}: {}", self.summary.cycle, e);
                }
            }
        }
    }
}
