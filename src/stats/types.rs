use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::PostureInterval;

/// One civil calendar day in the reference timezone, expressed as the
/// half-open instant range `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn overlaps(&self, interval: &PostureInterval) -> bool {
        interval.start_ts < self.end && interval.end_ts > self.start
    }

    pub fn contains(&self, interval: &PostureInterval) -> bool {
        interval.start_ts >= self.start && interval.end_ts <= self.end
    }
}

/// Per-label slice of a daily summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostureBucket {
    pub posture: String,
    pub duration_sec: i64,
    pub ratio: f64,
}

/// Daily time-in-posture aggregation for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureSummary {
    pub user_id: String,
    pub date: NaiveDate,
    pub total_duration_sec: i64,
    pub by_posture: Vec<PostureBucket>,
}
