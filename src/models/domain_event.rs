use crate::models::{EventMarker, MatchSnapshot};
use serde::{Deserialize, Serialize};

/// Identity of the match an event belongs to, with the names needed to render it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRef {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
}

impl From<&MatchSnapshot> for MatchRef {
    fn from(snapshot: &MatchSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            home_team: snapshot.home_team.clone(),
            away_team: snapshot.away_team.clone(),
        }
    }
}

/// Incident kinds reported through [`DomainEvent::CardEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    RedCard,
    Penalty,
    VarCheck,
}

impl From<EventMarker> for CardKind {
    fn from(marker: EventMarker) -> Self {
        match marker {
            EventMarker::RedCard => CardKind::RedCard,
            EventMarker::Penalty => CardKind::Penalty,
            EventMarker::VarCheck => CardKind::VarCheck,
        }
    }
}

/// A meaningful change derived from two consecutive observations of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Score changed. Which side scored is not tracked; the new score is carried instead.
    Goal {
        #[serde(rename = "match")]
        fixture: MatchRef,
        home_score: u32,
        away_score: u32,
        elapsed: u32,
        /// Either score went down: a goal was cancelled on review
        is_reversal: bool,
    },
    KickOff {
        #[serde(rename = "match")]
        fixture: MatchRef,
    },
    HalfTime {
        #[serde(rename = "match")]
        fixture: MatchRef,
    },
    SecondHalfStart {
        #[serde(rename = "match")]
        fixture: MatchRef,
    },
    FullTime {
        #[serde(rename = "match")]
        fixture: MatchRef,
        home_score: u32,
        away_score: u32,
    },
    CardEvent {
        #[serde(rename = "match")]
        fixture: MatchRef,
        team: Option<String>,
        kind: CardKind,
        elapsed: u32,
    },
}

impl DomainEvent {
    /// The match this event belongs to
    pub fn fixture(&self) -> &MatchRef {
        match self {
            DomainEvent::Goal { fixture, .. }
            | DomainEvent::KickOff { fixture }
            | DomainEvent::HalfTime { fixture }
            | DomainEvent::SecondHalfStart { fixture }
            | DomainEvent::FullTime { fixture, .. }
            | DomainEvent::CardEvent { fixture, .. } => fixture,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.fixture().id
    }

    /// Short name used in logs and WebSocket payloads
    pub fn kind_str(&self) -> &'static str {
        match self {
            DomainEvent::Goal { is_reversal: false, .. } => "goal",
            DomainEvent::Goal { is_reversal: true, .. } => "goal_cancelled",
            DomainEvent::KickOff { .. } => "kick_off",
            DomainEvent::HalfTime { .. } => "half_time",
            DomainEvent::SecondHalfStart { .. } => "second_half_start",
            DomainEvent::FullTime { .. } => "full_time",
            DomainEvent::CardEvent { kind: CardKind::RedCard, .. } => "red_card",
            DomainEvent::CardEvent { kind: CardKind::Penalty, .. } => "penalty",
            DomainEvent::CardEvent { kind: CardKind::VarCheck, .. } => "var_check",
        }
    }
}
