use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::parse_datetime,
    models::PostureInterval,
    repositories::sessions::SessionRepository,
};

fn row_to_interval(row: &Row) -> Result<PostureInterval> {
    let start_ts: String = row.get("start_ts")?;
    let end_ts: String = row.get("end_ts")?;

    Ok(PostureInterval {
        session_id: row.get("session_id")?,
        posture: row.get("posture")?,
        start_ts: parse_datetime(&start_ts, "start_ts")?,
        end_ts: parse_datetime(&end_ts, "end_ts")?,
        duration_sec: row.get("duration_sec")?,
    })
}

pub struct IntervalRepository<'a> {
    conn: &'a Connection,
}

impl<'a> IntervalRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, interval: &PostureInterval) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO posture_logs (session_id, posture, start_ts, end_ts, duration_sec)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    interval.session_id,
                    interval.posture,
                    interval.start_ts.to_rfc3339(),
                    interval.end_ts.to_rfc3339(),
                    interval.duration_sec,
                ],
            )
            .context("failed to insert posture interval")?;
        Ok(())
    }

    /// Fetches the user's intervals overlapping `[from, until)`, joined
    /// through their sessions. Containment and label filtering stay in the
    /// aggregator so the policy is testable without a database.
    pub fn overlapping_for_user(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<PostureInterval>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.session_id, p.posture, p.start_ts, p.end_ts, p.duration_sec
             FROM posture_logs p
             JOIN sessions s ON s.session_id = p.session_id
             WHERE s.user_id = ?1 AND p.start_ts < ?3 AND p.end_ts > ?2
             ORDER BY p.start_ts ASC",
        )?;

        let mut rows = stmt.query(params![
            user_id,
            from.to_rfc3339(),
            until.to_rfc3339(),
        ])?;

        let mut intervals = Vec::new();
        while let Some(row) = rows.next()? {
            intervals.push(row_to_interval(row)?);
        }
        Ok(intervals)
    }
}

/// Resolves the target session and appends one interval inside a single
/// transaction; a failure in either step leaves no row behind.
pub(crate) fn record_interval_tx(
    conn: &mut Connection,
    user_id: Option<&str>,
    session_id: Option<&str>,
    posture: &str,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
) -> Result<String> {
    let tx = conn.transaction()?;

    let resolved = SessionRepository::new(&tx).resolve(session_id, user_id)?;

    let interval = PostureInterval {
        session_id: resolved.clone(),
        posture: posture.to_string(),
        start_ts,
        end_ts,
        duration_sec: (end_ts - start_ts).num_seconds(),
    };
    IntervalRepository::new(&tx).insert(&interval)?;

    tx.commit().context("failed to commit posture interval")?;
    Ok(resolved)
}

impl Database {
    /// Ingest one posture interval; returns the session it was attached to.
    pub async fn record_interval(
        &self,
        user_id: Option<String>,
        session_id: Option<String>,
        posture: String,
        start_ts: DateTime<Utc>,
        end_ts: DateTime<Utc>,
    ) -> Result<String> {
        self.execute(move |conn| {
            record_interval_tx(
                conn,
                user_id.as_deref(),
                session_id.as_deref(),
                &posture,
                start_ts,
                end_ts,
            )
        })
        .await
    }

    pub async fn intervals_overlapping(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<PostureInterval>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            IntervalRepository::new(conn).overlapping_for_user(&user_id, from, until)
        })
        .await
    }
}
