use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordPostureRequest {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub posture: Option<String>,
    pub start_ts: Option<DateTime<Utc>>,
    pub end_ts: Option<DateTime<Utc>>,
}

fn validate(req: RecordPostureRequest) -> Result<ValidatedInterval, ApiError> {
    let missing = || ApiError::InvalidInterval("posture, start_ts, end_ts are required".into());

    let posture = req
        .posture
        .filter(|label| !label.is_empty())
        .ok_or_else(missing)?;
    let start_ts = req.start_ts.ok_or_else(missing)?;
    let end_ts = req.end_ts.ok_or_else(missing)?;

    if end_ts < start_ts {
        return Err(ApiError::InvalidInterval(
            "end_ts must not precede start_ts".into(),
        ));
    }

    Ok(ValidatedInterval {
        user_id: req.user_id,
        session_id: req.session_id.filter(|sid| !sid.is_empty()),
        posture,
        start_ts,
        end_ts,
    })
}

#[derive(Debug)]
struct ValidatedInterval {
    user_id: Option<String>,
    session_id: Option<String>,
    posture: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
}

pub async fn record_posture(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordPostureRequest>,
) -> Result<Json<Value>, ApiError> {
    let interval = validate(req)?;

    let session_id = state
        .db
        .record_interval(
            interval.user_id,
            interval.session_id,
            interval.posture,
            interval.start_ts,
            interval.end_ts,
        )
        .await
        .map_err(ApiError::from_storage)?;

    Ok(Json(json!({ "status": "ok", "session_id": session_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        posture: Option<&str>,
        start_ts: Option<&str>,
        end_ts: Option<&str>,
    ) -> RecordPostureRequest {
        let ts = |raw: Option<&str>| {
            raw.map(|s| {
                DateTime::parse_from_rfc3339(s)
                    .expect("test timestamp")
                    .with_timezone(&Utc)
            })
        };
        RecordPostureRequest {
            user_id: Some("u1".into()),
            session_id: None,
            posture: posture.map(str::to_string),
            start_ts: ts(start_ts),
            end_ts: ts(end_ts),
        }
    }

    #[test]
    fn missing_fields_are_invalid_intervals() {
        for req in [
            request(None, Some("2026-08-06T09:00:00Z"), Some("2026-08-06T09:30:00Z")),
            request(Some("sitting"), None, Some("2026-08-06T09:30:00Z")),
            request(Some("sitting"), Some("2026-08-06T09:00:00Z"), None),
            request(Some(""), Some("2026-08-06T09:00:00Z"), Some("2026-08-06T09:30:00Z")),
        ] {
            let err = validate(req).unwrap_err();
            assert!(matches!(err, ApiError::InvalidInterval(_)));
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = validate(request(
            Some("sitting"),
            Some("2026-08-06T09:30:00Z"),
            Some("2026-08-06T09:00:00Z"),
        ))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInterval(_)));
    }

    #[test]
    fn zero_length_intervals_are_accepted() {
        let validated = validate(request(
            Some("sitting"),
            Some("2026-08-06T09:00:00Z"),
            Some("2026-08-06T09:00:00Z"),
        ))
        .unwrap();
        assert_eq!(validated.start_ts, validated.end_ts);
    }

    #[test]
    fn empty_session_id_counts_as_absent() {
        let mut req = request(
            Some("sitting"),
            Some("2026-08-06T09:00:00Z"),
            Some("2026-08-06T09:30:00Z"),
        );
        req.session_id = Some(String::new());
        let validated = validate(req).unwrap();
        assert_eq!(validated.session_id, None);
    }
}
