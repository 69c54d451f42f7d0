use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime},
    models::Session,
};
use crate::error::ApiError;

fn row_to_session(row: &Row) -> Result<Session> {
    let start_ts: String = row.get("start_ts")?;
    let end_ts: Option<String> = row.get("end_ts")?;

    Ok(Session {
        session_id: row.get("session_id")?,
        user_id: row.get("user_id")?,
        start_ts: parse_datetime(&start_ts, "start_ts")?,
        end_ts: parse_optional_datetime(end_ts, "end_ts")?,
    })
}

pub struct SessionRepository<'a> {
    conn: &'a rusqlite::Connection,
}

impl<'a> SessionRepository<'a> {
    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (session_id, user_id, start_ts, end_ts)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.session_id,
                session.user_id,
                session.start_ts.to_rfc3339(),
                session.end_ts.as_ref().map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, user_id, start_ts, end_ts
             FROM sessions
             WHERE session_id = ?1",
        )?;

        let mut rows = stmt.query(params![session_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_session(row)?)),
            None => Ok(None),
        }
    }

    /// Picks the open session to attach new intervals to. Latest start wins;
    /// equal starts fall back to the highest identifier so the choice is
    /// deterministic.
    pub fn find_open_session_id(&self, user_id: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT session_id FROM sessions
                 WHERE user_id = ?1 AND end_ts IS NULL
                 ORDER BY start_ts DESC, session_id DESC
                 LIMIT 1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Resolves the session a new interval belongs to. An explicit
    /// `session_id` is trusted as-is; the caller owns its correctness.
    pub fn resolve(
        &self,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        if let Some(explicit) = session_id {
            return Ok(explicit.to_string());
        }

        let Some(user_id) = user_id else {
            return Err(ApiError::NoOpenSession.into());
        };

        self.find_open_session_id(user_id)?
            .ok_or_else(|| ApiError::NoOpenSession.into())
    }

    /// Opens a fresh session for the user, first closing anything left open
    /// by a missed logout so at most one session stays open per user.
    pub fn open_session(&self, user_id: &str, ts: DateTime<Utc>) -> Result<Session> {
        self.conn.execute(
            "UPDATE sessions SET end_ts = ?1 WHERE user_id = ?2 AND end_ts IS NULL",
            params![ts.to_rfc3339(), user_id],
        )?;

        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            start_ts: ts,
            end_ts: None,
        };
        self.insert(&session)?;
        Ok(session)
    }

    /// Stamps `end_ts` on the user's open session. Returns the closed
    /// session id, or `None` when nothing was open (logout is idempotent).
    pub fn close_open_session(
        &self,
        user_id: &str,
        ts: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let Some(session_id) = self.find_open_session_id(user_id)? else {
            return Ok(None);
        };

        self.conn.execute(
            "UPDATE sessions SET end_ts = ?1 WHERE session_id = ?2",
            params![ts.to_rfc3339(), session_id],
        )?;
        Ok(Some(session_id))
    }
}

// Async wrappers for the lifecycle-event path.
impl Database {
    pub async fn open_session(&self, user_id: &str, ts: DateTime<Utc>) -> Result<Session> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let session = SessionRepository::new(&tx).open_session(&user_id, ts)?;
            tx.commit()?;
            Ok(session)
        })
        .await
    }

    pub async fn close_open_session(
        &self,
        user_id: &str,
        ts: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let closed = SessionRepository::new(&tx).close_open_session(&user_id, ts)?;
            tx.commit()?;
            Ok(closed)
        })
        .await
    }
}
