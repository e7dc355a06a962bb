mod helpers;

use helpers::*;
use vortex_backend::detector::{ChangeDetector, DetectorConfig};
use vortex_backend::models::*;

fn observe(detector: &mut ChangeDetector, batch: Vec<MatchRecord>) -> Vec<DomainEvent> {
    detector.observe(batch).collect()
}

/// First observation of a match only seeds memory
#[test]
fn test_first_sight_suppression() {
    let mut detector = ChangeDetector::default();

    let events = observe(&mut detector, vec![live("1", 3, 2, "2H")]);

    assert!(events.is_empty());
    assert_eq!(detector.tracked_matches(), 1);

    // The seeded state is the baseline for the next cycle
    assert!(observe(&mut detector, vec![live("1", 3, 2, "2H")]).is_empty());
    let events = observe(&mut detector, vec![live("1", 3, 3, "2H")]);
    assert!(matches!(events.as_slice(), [DomainEvent::Goal { is_reversal: false, .. }]));
}

#[test]
fn test_goal_detection() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 1, 0, "1H")]);

    let events = observe(&mut detector, vec![live("1", 2, 0, "1H")]);

    assert_eq!(events.len(), 1);
    match &events[0] {
        DomainEvent::Goal {
            fixture,
            home_score,
            away_score,
            is_reversal,
            ..
        } => {
            assert_eq!(fixture.id, "1");
            assert_eq!((*home_score, *away_score), (2, 0));
            assert!(!is_reversal);
        }
        other => panic!("expected goal, got {:?}", other),
    }
}

#[test]
fn test_var_reversal() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 2, 0, "1H")]);

    let events = observe(&mut detector, vec![live("1", 1, 0, "1H")]);

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        DomainEvent::Goal {
            is_reversal: true,
            home_score: 1,
            away_score: 0,
            ..
        }
    ));
}

#[test]
fn test_no_duplicate_on_unchanged_input() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 1, 1, "1H")]);

    assert!(observe(&mut detector, vec![live("1", 1, 1, "1H")]).is_empty());
    assert!(observe(&mut detector, vec![live("1", 1, 1, "1H")]).is_empty());
}

#[test]
fn test_status_mapping_across_a_match() {
    let mut detector = ChangeDetector::default();
    let mut kinds = Vec::new();

    for status in ["NS", "1H", "HT", "2H", "FT"] {
        let events = observe(&mut detector, vec![live("1", 0, 0, status)]);
        assert!(events.len() <= 1);
        kinds.extend(events.iter().map(DomainEvent::kind_str));
    }

    assert_eq!(kinds, vec!["kick_off", "half_time", "second_half_start", "full_time"]);
}

#[test]
fn test_live_status_counts_as_kick_off() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 0, 0, "NS")]);

    let events = observe(&mut detector, vec![live("1", 0, 0, "live")]);
    assert!(matches!(events.as_slice(), [DomainEvent::KickOff { .. }]));
}

#[test]
fn test_second_half_disabled_by_config() {
    let mut detector = ChangeDetector::new(DetectorConfig {
        notify_second_half: false,
    });
    let mut kinds = Vec::new();

    for status in ["NS", "1H", "HT", "2H", "FT"] {
        let events = observe(&mut detector, vec![live("1", 0, 0, status)]);
        kinds.extend(events.iter().map(DomainEvent::kind_str));
    }

    assert_eq!(kinds, vec!["kick_off", "half_time", "full_time"]);
}

#[test]
fn test_event_deduplication_by_timestamp() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 0, 0, "1H")]);

    let red_card = arsenal_chelsea("1")
        .with_status(MatchStatus::FirstHalf)
        .with_last_event(EventMarker::RedCard, 1001, Some("Chelsea".to_string()));
    let events = observe(&mut detector, vec![MatchRecord::from(&red_card)]);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        DomainEvent::CardEvent {
            kind: CardKind::RedCard,
            ..
        }
    ));

    // Same event time, other fields moved on: the card is not re-announced
    let later = red_card.clone().with_score(1, 0).with_elapsed(60);
    let events = observe(&mut detector, vec![MatchRecord::from(&later)]);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], DomainEvent::Goal { .. }));

    let penalty = later.with_last_event(EventMarker::Penalty, 1002, Some("Arsenal".to_string()));
    let events = observe(&mut detector, vec![MatchRecord::from(&penalty)]);
    assert_eq!(events.len(), 1);
    match &events[0] {
        DomainEvent::CardEvent { kind, team, .. } => {
            assert_eq!(*kind, CardKind::Penalty);
            assert_eq!(team.as_deref(), Some("Arsenal"));
        }
        other => panic!("expected card event, got {:?}", other),
    }
}

#[test]
fn test_batch_isolation() {
    let mut detector = ChangeDetector::default();

    let mut batch: Vec<MatchRecord> = (0..9).map(|i| live(&format!("m{}", i), 0, 0, "NS")).collect();
    batch.insert(4, MatchRecord {
        home_team: Some("Nameless".to_string()),
        ..Default::default()
    });
    assert_eq!(batch.len(), 10);

    let mut cycle = detector.observe(batch);
    assert_eq!(cycle.by_ref().count(), 0);
    let summary = cycle.summary();
    drop(cycle);

    assert_eq!(summary.processed, 9);
    assert_eq!(summary.skipped, 1);
    assert_eq!(detector.tracked_matches(), 9);

    // The nine seeded matches behave normally in the next cycle
    let batch: Vec<MatchRecord> = (0..9).map(|i| live(&format!("m{}", i), 0, 0, "1H")).collect();
    assert_eq!(observe(&mut detector, batch).len(), 9);
}

#[test]
fn test_goal_precedes_status_event() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 0, 0, "2H")]);

    let events = observe(&mut detector, vec![live("1", 0, 1, "FT")]);
    let kinds: Vec<_> = events.iter().map(DomainEvent::kind_str).collect();
    assert_eq!(kinds, vec!["goal", "full_time"]);
}

#[test]
fn test_absent_match_keeps_memory() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 0, 0, "1H"), live("2", 0, 0, "1H")]);

    // Match 2 drops out of one cycle
    assert!(observe(&mut detector, vec![live("1", 0, 0, "1H")]).is_empty());

    // Reappearing unchanged is silent, a change is reported rather than re-seeded
    assert!(observe(&mut detector, vec![live("1", 0, 0, "1H"), live("2", 0, 0, "1H")]).is_empty());
    let events = observe(&mut detector, vec![live("2", 1, 0, "1H")]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].match_id(), "2");
}

#[test]
fn test_matches_are_independent_within_a_batch() {
    let mut detector = ChangeDetector::default();
    observe(&mut detector, vec![live("1", 0, 0, "1H"), live("2", 2, 2, "2H")]);

    let events = observe(&mut detector, vec![live("2", 2, 3, "2H"), live("1", 0, 0, "HT")]);
    let summary: Vec<_> = events.iter().map(|e| (e.match_id(), e.kind_str())).collect();
    assert_eq!(summary, vec![("2", "goal"), ("1", "half_time")]);
}
