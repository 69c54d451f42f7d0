//! Request-level error taxonomy.
//!
//! Every condition here is local and non-retryable: it is surfaced to the
//! caller as a 400 response with a human-readable message and never takes the
//! process down with it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field was absent.
    #[error("{0} required")]
    MissingParameter(&'static str),

    /// Session resolution found nothing to attach an interval to.
    #[error("No open session found. Provide session_id or send login event first.")]
    NoOpenSession,

    /// The interval payload was malformed.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// The lifecycle event type is not one we handle.
    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),

    /// The storage layer failed while building a summary.
    #[error("aggregation failed: {0}")]
    AggregationFailed(anyhow::Error),

    /// Storage failure outside the aggregation path; the message is
    /// surfaced as-is.
    #[error("{0}")]
    Storage(anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::NoOpenSession
            | Self::InvalidInterval(_)
            | Self::UnsupportedEventType(_)
            | Self::AggregationFailed(_)
            | Self::Storage(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Recovers a typed condition that crossed the anyhow-based storage
    /// boundary on a write path; anything else passes through verbatim.
    pub fn from_storage(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(other) => Self::Storage(other),
        }
    }

    /// Same recovery for the read-aggregation path, where untyped failures
    /// are reported as `AggregationFailed`.
    pub fn aggregation(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(other) => Self::AggregationFailed(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_bad_request() {
        let variants = [
            ApiError::MissingParameter("user_id"),
            ApiError::NoOpenSession,
            ApiError::InvalidInterval("end_ts before start_ts".into()),
            ApiError::UnsupportedEventType("nap".into()),
            ApiError::AggregationFailed(anyhow::anyhow!("disk gone")),
            ApiError::Storage(anyhow::anyhow!("database is locked")),
        ];
        for variant in variants {
            assert_eq!(variant.status_code(), StatusCode::BAD_REQUEST, "{variant}");
        }
    }

    #[test]
    fn missing_parameter_names_the_field() {
        assert_eq!(
            ApiError::MissingParameter("user_id").to_string(),
            "user_id required"
        );
    }

    #[test]
    fn typed_errors_survive_the_storage_boundary() {
        let wrapped: anyhow::Error = ApiError::NoOpenSession.into();
        match ApiError::from_storage(wrapped) {
            ApiError::NoOpenSession => {}
            other => panic!("expected NoOpenSession, got {other:?}"),
        }

        let plain = anyhow::anyhow!("database is locked");
        match ApiError::from_storage(plain) {
            ApiError::Storage(err) => assert_eq!(err.to_string(), "database is locked"),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn untyped_read_failures_become_aggregation_failed() {
        let err = ApiError::aggregation(anyhow::anyhow!("disk gone"));
        assert!(matches!(err, ApiError::AggregationFailed(_)));
        assert!(err.to_string().starts_with("aggregation failed"));
    }
}
