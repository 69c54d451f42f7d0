use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous span during which a user held one posture classification.
/// Append-only: rows are inserted once a segment ends and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostureInterval {
    pub session_id: String,
    pub posture: String,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub duration_sec: i64,
}

impl PostureInterval {
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_sec)
    }
}
