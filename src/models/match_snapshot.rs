use serde::{Deserialize, Serialize};
use std::fmt;

/// Match status as reported by the fixture feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    Penalties,
    FullTime,
    Live,
    /// Any code the feed sends that we don't model, stored upper-cased
    Other(String),
}

impl MatchStatus {
    /// Parse a short status code (case-insensitive)
    pub fn from_code(code: &str) -> Self {
        let upper = code.trim().to_uppercase();
        match upper.as_str() {
            "NS" => MatchStatus::NotStarted,
            "1H" => MatchStatus::FirstHalf,
            "HT" => MatchStatus::HalfTime,
            "2H" => MatchStatus::SecondHalf,
            "ET" => MatchStatus::ExtraTime,
            "P" => MatchStatus::Penalties,
            "FT" => MatchStatus::FullTime,
            "LIVE" => MatchStatus::Live,
            _ => MatchStatus::Other(upper.clone()),
        }
    }

    /// Upper-case short code, used as the comparison key between cycles
    pub fn code(&self) -> &str {
        match self {
            MatchStatus::NotStarted => "NS",
            MatchStatus::FirstHalf => "1H",
            MatchStatus::HalfTime => "HT",
            MatchStatus::SecondHalf => "2H",
            MatchStatus::ExtraTime => "ET",
            MatchStatus::Penalties => "P",
            MatchStatus::FullTime => "FT",
            MatchStatus::Live => "LIVE",
            MatchStatus::Other(code) => code,
        }
    }
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::NotStarted
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of in-match incident carried on the last-event marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMarker {
    RedCard,
    Penalty,
    VarCheck,
}

impl EventMarker {
    /// Parse a marker string from the store.
    ///
    /// Returns `Ok(None)` for an explicit "no event" and `Err` for anything unrecognised.
    pub fn parse(s: &str) -> Result<Option<Self>, String> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "" | "NONE" => Ok(None),
            "RED_CARD" | "REDCARD" => Ok(Some(EventMarker::RedCard)),
            "PENALTY" => Ok(Some(EventMarker::Penalty)),
            "VAR" | "VAR_CHECK" => Ok(Some(EventMarker::VarCheck)),
            _ => Err(format!("Unknown event marker: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventMarker::RedCard => "RED_CARD",
            EventMarker::Penalty => "PENALTY",
            EventMarker::VarCheck => "VAR",
        }
    }
}

/// The most recent incident attached to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub marker: EventMarker,
    /// Feed timestamp of the incident; used to de-duplicate
    pub time: i64,
    pub team: Option<String>,
}

/// One fixture at one observation instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    pub elapsed: u32,
    pub last_event: Option<LastEvent>,
}

impl MatchSnapshot {
    /// Create a not-started snapshot with a 0-0 score
    pub fn new(id: impl Into<String>, home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: 0,
            away_score: 0,
            status: MatchStatus::NotStarted,
            elapsed: 0,
            last_event: None,
        }
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.home_score = home;
        self.away_score = away;
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_elapsed(mut self, elapsed: u32) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_last_event(mut self, marker: EventMarker, time: i64, team: Option<String>) -> Self {
        self.last_event = Some(LastEvent { marker, time, team });
        self
    }

    /// Score comparison key, e.g. "2-1"
    pub fn score_key(&self) -> String {
        format!("{}-{}", self.home_score, self.away_score)
    }

    /// Status comparison key (upper-case short code)
    pub fn status_key(&self) -> String {
        self.status.code().to_string()
    }
}
