use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the SQLite store. A dedicated worker thread owns the
/// connection; callers submit closures and await the result, which also
/// serializes writes so each resolve-then-insert runs without interleaving.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("posture-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::error::ApiError;
    use crate::stats;

    #[tokio::test]
    async fn full_ingest_and_aggregate_flow_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("posture.sqlite3")).unwrap();

        let now = Utc::now();
        let window = stats::day_window_at(now);
        // Keep the fixture interval inside today's window even when the test
        // runs close to civil midnight.
        let start = window.start + Duration::hours(1);
        let end = start + Duration::minutes(30);

        let session = db.open_session("u1", now).await.unwrap();
        let recorded = db
            .record_interval(Some("u1".into()), None, "sitting".into(), start, end)
            .await
            .unwrap();
        assert_eq!(recorded, session.session_id);

        let intervals = db
            .intervals_overlapping("u1", window.start, window.end)
            .await
            .unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration_sec, 1800);

        let summary = stats::summarize("u1", &window, &intervals, true);
        assert_eq!(summary.total_duration_sec, 1800);
        assert_eq!(summary.by_posture[0].posture, "sitting");
    }

    #[tokio::test]
    async fn ingest_without_open_session_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("posture.sqlite3")).unwrap();

        let now = Utc::now();
        let err = db
            .record_interval(
                Some("u1".into()),
                None,
                "sitting".into(),
                now,
                now + Duration::minutes(5),
            )
            .await
            .unwrap_err();
        match ApiError::from_storage(err) {
            ApiError::NoOpenSession => {}
            other => panic!("expected NoOpenSession, got {other:?}"),
        }

        let rows: i64 = db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM posture_logs", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
