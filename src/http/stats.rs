use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::stats::{self, PostureSummary};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub user_id: Option<String>,
}

/// Daily time-in-posture summary for the civil day containing "now" in the
/// reference zone.
pub async fn today(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<PostureSummary>, ApiError> {
    let user_id = query
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParameter("user_id"))?;

    let window = stats::today_window();
    let intervals = state
        .db
        .intervals_overlapping(&user_id, window.start, window.end)
        .await
        .map_err(ApiError::aggregation)?;

    let summary = stats::summarize(
        &user_id,
        &window,
        &intervals,
        state.config.collect_ambiguous,
    );
    Ok(Json(summary))
}
