use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One continuous usage period for a user. `end_ts` is null while the
/// session is open; resolver and lifecycle logic keep at most one session
/// open per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.end_ts.is_none()
    }
}
