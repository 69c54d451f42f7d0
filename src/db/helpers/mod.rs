use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_any_offset_to_utc() {
        let parsed = parse_datetime("2026-08-06T09:00:00+09:00", "start_ts").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-08-06T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage_with_the_field_name() {
        let err = parse_datetime("yesterday", "end_ts").unwrap_err();
        assert!(err.to_string().contains("end_ts"));
    }
}
