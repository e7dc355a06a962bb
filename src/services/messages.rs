//! Human-readable text for domain events, shared by the chat sinks.

use crate::models::{CardKind, DomainEvent, MatchRef};

fn fixture_line(fixture: &MatchRef) -> String {
    format!("{} vs {}", fixture.home_team, fixture.away_team)
}

fn scoreline(fixture: &MatchRef, home: u32, away: u32) -> String {
    format!("{} {} - {} {}", fixture.home_team, home, away, fixture.away_team)
}

fn minute(elapsed: u32) -> String {
    if elapsed == 0 {
        String::new()
    } else {
        format!(" ({}')", elapsed)
    }
}

/// Render an event as a chat message
pub fn render_event(event: &DomainEvent) -> String {
    match event {
        DomainEvent::Goal {
            fixture,
            home_score,
            away_score,
            elapsed,
            is_reversal: false,
        } => format!(
            "⚽ GOAL!{}\n{}",
            minute(*elapsed),
            scoreline(fixture, *home_score, *away_score)
        ),
        DomainEvent::Goal {
            fixture,
            home_score,
            away_score,
            elapsed,
            is_reversal: true,
        } => format!(
            "❌ GOAL CANCELLED (VAR){}\n{}",
            minute(*elapsed),
            scoreline(fixture, *home_score, *away_score)
        ),
        DomainEvent::KickOff { fixture } => {
            format!("🏁 KICK-OFF!\n{} is underway", fixture_line(fixture))
        }
        DomainEvent::HalfTime { fixture } => format!("⏸️ HALF-TIME\n{}", fixture_line(fixture)),
        DomainEvent::SecondHalfStart { fixture } => {
            format!("▶️ SECOND HALF\n{} is back underway", fixture_line(fixture))
        }
        DomainEvent::FullTime {
            fixture,
            home_score,
            away_score,
        } => format!(
            "🔚 FULL-TIME\n{}",
            scoreline(fixture, *home_score, *away_score)
        ),
        DomainEvent::CardEvent {
            fixture,
            team,
            kind,
            elapsed,
        } => {
            let headline = match kind {
                CardKind::RedCard => "🟥 RED CARD",
                CardKind::Penalty => "🎯 PENALTY",
                CardKind::VarCheck => "📺 VAR CHECK",
            };
            match team {
                Some(team) => format!(
                    "{}{}\n{} ({})",
                    headline,
                    minute(*elapsed),
                    team,
                    fixture_line(fixture)
                ),
                None => format!("{}{}\n{}", headline, minute(*elapsed), fixture_line(fixture)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MatchRef {
        MatchRef {
            id: "1".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
        }
    }

    #[test]
    fn test_goal_messages() {
        let goal = DomainEvent::Goal {
            fixture: fixture(),
            home_score: 2,
            away_score: 1,
            elapsed: 67,
            is_reversal: false,
        };
        assert_eq!(render_event(&goal), "⚽ GOAL! (67')\nArsenal 2 - 1 Chelsea");

        let cancelled = DomainEvent::Goal {
            fixture: fixture(),
            home_score: 1,
            away_score: 1,
            elapsed: 0,
            is_reversal: true,
        };
        assert_eq!(render_event(&cancelled), "❌ GOAL CANCELLED (VAR)\nArsenal 1 - 1 Chelsea");
    }

    #[test]
    fn test_card_message_with_and_without_team() {
        let with_team = DomainEvent::CardEvent {
            fixture: fixture(),
            team: Some("Chelsea".to_string()),
            kind: CardKind::RedCard,
            elapsed: 38,
        };
        assert_eq!(render_event(&with_team), "🟥 RED CARD (38')\nChelsea (Arsenal vs Chelsea)");

        let without_team = DomainEvent::CardEvent {
            fixture: fixture(),
            team: None,
            kind: CardKind::VarCheck,
            elapsed: 0,
        };
        assert_eq!(render_event(&without_team), "📺 VAR CHECK\nArsenal vs Chelsea");
    }

    #[test]
    fn test_status_messages() {
        let ft = DomainEvent::FullTime {
            fixture: fixture(),
            home_score: 0,
            away_score: 0,
        };
        assert_eq!(render_event(&ft), "🔚 FULL-TIME\nArsenal 0 - 0 Chelsea");
        assert!(render_event(&DomainEvent::KickOff { fixture: fixture() }).starts_with("🏁 KICK-OFF!"));
    }
}
