//! HTTP surface: routing plus thin handlers over the storage handle and the
//! aggregation core.

mod events;
mod postures;
mod stats;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events", post(events::record_event))
        .route("/api/postures", post(postures::record_posture))
        .route("/api/stats/today", get(stats::today))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "ts": Utc::now() }))
}
