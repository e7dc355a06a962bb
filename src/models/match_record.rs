use crate::models::{EventMarker, LastEvent, MatchSnapshot, MatchStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use tracing::warn;

/// Errors raised while turning a raw record into a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Match row as stored in the `matches` table (or pushed by a feed).
///
/// Every field is optional: the ingestion job merges partial documents, so nothing
/// here is trusted until it has been through [`MatchSnapshot::try_from`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct MatchRecord {
    pub fixture_id: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub status: Option<String>,
    pub elapsed: Option<i32>,
    pub last_event: Option<String>,
    pub event_time: Option<i64>,
    pub event_team: Option<String>,
    pub league: Option<String>,
    pub kick_off_time: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Build a record from a typed snapshot (used by ingestion tooling and tests)
    pub fn from_snapshot(snapshot: &MatchSnapshot) -> Self {
        Self {
            fixture_id: Some(snapshot.id.clone()),
            home_team: Some(snapshot.home_team.clone()),
            away_team: Some(snapshot.away_team.clone()),
            home_score: Some(snapshot.home_score as i32),
            away_score: Some(snapshot.away_score as i32),
            status: Some(snapshot.status.code().to_string()),
            elapsed: Some(snapshot.elapsed as i32),
            last_event: snapshot.last_event.as_ref().map(|e| e.marker.as_str().to_string()),
            event_time: snapshot.last_event.as_ref().map(|e| e.time),
            event_team: snapshot.last_event.as_ref().and_then(|e| e.team.clone()),
            league: None,
            kick_off_time: None,
        }
    }
}

impl From<&MatchSnapshot> for MatchRecord {
    fn from(snapshot: &MatchSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

impl From<MatchSnapshot> for MatchRecord {
    fn from(snapshot: MatchSnapshot) -> Self {
        Self::from_snapshot(&snapshot)
    }
}

fn non_negative(value: Option<i32>, field: &str, id: &str) -> u32 {
    match value {
        Some(v) if v < 0 => {
            warn!("Match {} has negative {} ({}), using 0", id, field, v);
            0
        }
        Some(v) => v as u32,
        None => 0,
    }
}

impl TryFrom<MatchRecord> for MatchSnapshot {
    type Error = SnapshotError;

    fn try_from(record: MatchRecord) -> Result<Self, Self::Error> {
        let id = record
            .fixture_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SnapshotError::MalformedSnapshot(format!(
                    "missing identifier ({} vs {})",
                    record.home_team.as_deref().unwrap_or("?"),
                    record.away_team.as_deref().unwrap_or("?")
                ))
            })?;

        let marker = match record.last_event.as_deref().map(EventMarker::parse) {
            Some(Ok(marker)) => marker,
            Some(Err(e)) => {
                warn!("Match {}: {}, ignoring", id, e);
                None
            }
            None => None,
        };

        let last_event = match (marker, record.event_time) {
            (Some(marker), Some(time)) => Some(LastEvent {
                marker,
                time,
                team: record.event_team,
            }),
            (Some(marker), None) => {
                warn!("Match {}: {} marker without event time, ignoring", id, marker.as_str());
                None
            }
            (None, _) => None,
        };

        Ok(MatchSnapshot {
            home_score: non_negative(record.home_score, "home score", &id),
            away_score: non_negative(record.away_score, "away score", &id),
            elapsed: non_negative(record.elapsed, "elapsed", &id),
            status: record
                .status
                .as_deref()
                .map(MatchStatus::from_code)
                .unwrap_or_default(),
            home_team: record.home_team.unwrap_or_else(|| "Home".to_string()),
            away_team: record.away_team.unwrap_or_else(|| "Away".to_string()),
            last_event,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>) -> MatchRecord {
        MatchRecord {
            fixture_id: id.map(String::from),
            home_team: Some("Arsenal".to_string()),
            away_team: Some("Chelsea".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_identifier_is_malformed() {
        assert!(matches!(
            MatchSnapshot::try_from(record(None)),
            Err(SnapshotError::MalformedSnapshot(_))
        ));
        assert!(MatchSnapshot::try_from(record(Some("   "))).is_err());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let snapshot = MatchSnapshot::try_from(record(Some("1001"))).unwrap();
        assert_eq!(snapshot.id, "1001");
        assert_eq!(snapshot.home_score, 0);
        assert_eq!(snapshot.away_score, 0);
        assert_eq!(snapshot.status, MatchStatus::NotStarted);
        assert_eq!(snapshot.elapsed, 0);
        assert!(snapshot.last_event.is_none());
    }

    #[test]
    fn test_marker_requires_event_time() {
        let mut raw = record(Some("7"));
        raw.last_event = Some("RED_CARD".to_string());
        assert!(MatchSnapshot::try_from(raw.clone()).unwrap().last_event.is_none());

        raw.event_time = Some(1001);
        raw.event_team = Some("Chelsea".to_string());
        let event = MatchSnapshot::try_from(raw).unwrap().last_event.unwrap();
        assert_eq!(event.marker, EventMarker::RedCard);
        assert_eq!(event.time, 1001);
        assert_eq!(event.team.as_deref(), Some("Chelsea"));
    }

    #[test]
    fn test_unknown_marker_is_dropped() {
        let mut raw = record(Some("7"));
        raw.last_event = Some("YELLOW_CARD".to_string());
        raw.event_time = Some(5);
        assert!(MatchSnapshot::try_from(raw).unwrap().last_event.is_none());
    }

    #[test]
    fn test_negative_score_is_clamped() {
        let mut raw = record(Some("7"));
        raw.home_score = Some(-1);
        raw.away_score = Some(3);
        let snapshot = MatchSnapshot::try_from(raw).unwrap();
        assert_eq!(snapshot.score_key(), "0-3");
    }
}
