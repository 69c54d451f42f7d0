use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub ts: Option<DateTime<Utc>>,
}

/// Session lifecycle events. A login opens a fresh session (closing any the
/// user left open), a logout stamps the open session's end.
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = req
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParameter("user_id"))?;
    let kind = req
        .kind
        .filter(|kind| !kind.is_empty())
        .ok_or(ApiError::MissingParameter("type"))?;
    let ts = req.ts.unwrap_or_else(Utc::now);

    match kind.as_str() {
        "login" => {
            let session = state
                .db
                .open_session(&user_id, ts)
                .await
                .map_err(ApiError::from_storage)?;
            Ok(Json(json!({
                "status": "ok",
                "session_id": session.session_id,
            })))
        }
        "logout" => {
            let closed = state
                .db
                .close_open_session(&user_id, ts)
                .await
                .map_err(ApiError::from_storage)?;
            Ok(Json(json!({
                "status": "ok",
                "session_id": closed,
            })))
        }
        other => Err(ApiError::UnsupportedEventType(other.to_string())),
    }
}
