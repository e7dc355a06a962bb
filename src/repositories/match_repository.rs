use crate::models::MatchRecord;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result as SqlxResult};

const MATCH_COLUMNS: &str = r#"
    fixture_id,
    home_team,
    away_team,
    home_score,
    away_score,
    status,
    elapsed,
    last_event,
    event_time,
    event_team,
    league,
    kick_off_time
"#;

/// Repository for match documents
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    /// Create a new MatchRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Matches kicking off within `[from, to)`, plus anything still in play
    pub async fn find_live_matches(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SqlxResult<Vec<MatchRecord>> {
        let query = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE (kick_off_time >= $1 AND kick_off_time < $2)
               OR UPPER(status) IN ('1H', 'HT', '2H', 'ET', 'P', 'LIVE')
            ORDER BY kick_off_time ASC NULLS LAST, fixture_id ASC
            "#
        );
        sqlx::query_as::<_, MatchRecord>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
    }

    /// Find a match by fixture id
    pub async fn find_by_id(&self, fixture_id: &str) -> SqlxResult<Option<MatchRecord>> {
        let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE fixture_id = $1");
        sqlx::query_as::<_, MatchRecord>(&query)
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert or merge a match document. `None` fields keep the stored value.
    pub async fn upsert(&self, record: &MatchRecord) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (
                fixture_id, home_team, away_team, home_score, away_score, status,
                elapsed, last_event, event_time, event_team, league, kick_off_time
            )
            VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), COALESCE($6, 'NS'),
                    COALESCE($7, 0), $8, $9, $10, $11, $12)
            ON CONFLICT (fixture_id) DO UPDATE SET
                home_team     = COALESCE(EXCLUDED.home_team, matches.home_team),
                away_team     = COALESCE(EXCLUDED.away_team, matches.away_team),
                home_score    = COALESCE($4, matches.home_score),
                away_score    = COALESCE($5, matches.away_score),
                status        = COALESCE($6, matches.status),
                elapsed       = COALESCE($7, matches.elapsed),
                last_event    = COALESCE(EXCLUDED.last_event, matches.last_event),
                event_time    = COALESCE(EXCLUDED.event_time, matches.event_time),
                event_team    = COALESCE(EXCLUDED.event_team, matches.event_team),
                league        = COALESCE(EXCLUDED.league, matches.league),
                kick_off_time = COALESCE(EXCLUDED.kick_off_time, matches.kick_off_time),
                updated_at    = NOW()
            "#,
        )
        .bind(&record.fixture_id)
        .bind(&record.home_team)
        .bind(&record.away_team)
        .bind(record.home_score)
        .bind(record.away_score)
        .bind(&record.status)
        .bind(record.elapsed)
        .bind(&record.last_event)
        .bind(record.event_time)
        .bind(&record.event_team)
        .bind(&record.league)
        .bind(record.kick_off_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
