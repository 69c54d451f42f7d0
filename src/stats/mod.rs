//! Daily time-in-posture aggregation.
//!
//! The day window and the selection policy live here as plain functions over
//! already-fetched intervals, so the reporting rules can be exercised without
//! a database. The repository layer only narrows the fetch (user + overlap);
//! containment and the ambiguous filter are applied here.

mod types;

pub use types::{DayWindow, PostureBucket, PostureSummary};

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use crate::db::models::PostureInterval;

/// The reference timezone is fixed-offset UTC+9 (KST). Stats are reported
/// against civil days in this zone regardless of where clients run.
pub const REFERENCE_OFFSET_SECS: i32 = 9 * 3600;

/// Labels with this prefix can be excluded from aggregation via config.
pub const AMBIGUOUS_PREFIX: &str = "ambiguous";

fn reference_zone() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_SECS).expect("reference offset is within a day")
}

/// Computes the civil-day window containing `instant`.
///
/// The window end is start + 24h; valid because the reference zone has a
/// fixed offset, so every civil day is exactly 24 hours long.
pub fn day_window_at(instant: DateTime<Utc>) -> DayWindow {
    let zone = reference_zone();
    let civil = instant.with_timezone(&zone);
    let date = civil.date_naive();

    // A fixed offset maps each civil time to exactly one instant.
    let start = zone
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .expect("civil midnight is unambiguous in a fixed-offset zone")
        .with_timezone(&Utc);

    DayWindow {
        date,
        start,
        end: start + Duration::hours(24),
    }
}

pub fn today_window() -> DayWindow {
    day_window_at(Utc::now())
}

/// Builds the daily summary from intervals fetched for one user.
///
/// An interval counts only if it both overlaps the window and lies fully
/// inside it; spans that cross a day boundary are excluded from both
/// adjacent days rather than clipped. With `include_ambiguous` off,
/// `ambiguous*` labels are dropped before grouping.
pub fn summarize(
    user_id: &str,
    window: &DayWindow,
    intervals: &[PostureInterval],
    include_ambiguous: bool,
) -> PostureSummary {
    let mut seconds_by_label: BTreeMap<&str, i64> = BTreeMap::new();
    for interval in intervals {
        if !window.overlaps(interval) || !window.contains(interval) {
            continue;
        }
        if !include_ambiguous && interval.posture.starts_with(AMBIGUOUS_PREFIX) {
            continue;
        }
        *seconds_by_label.entry(interval.posture.as_str()).or_insert(0) +=
            interval.duration_sec;
    }

    let total_duration_sec: i64 = seconds_by_label.values().sum();

    // A day with nothing on the clock reports an empty breakdown, even if
    // zero-length intervals were selected.
    let mut by_posture: Vec<PostureBucket> = if total_duration_sec > 0 {
        seconds_by_label
            .into_iter()
            .map(|(posture, duration_sec)| PostureBucket {
                posture: posture.to_string(),
                duration_sec,
                ratio: duration_sec as f64 / total_duration_sec as f64,
            })
            .collect()
    } else {
        Vec::new()
    };

    // BTreeMap iteration is label-ascending; the stable sort keeps that as
    // the tie-break under the duration-descending order.
    by_posture.sort_by(|a, b| b.duration_sec.cmp(&a.duration_sec));

    PostureSummary {
        user_id: user_id.to_string(),
        date: window.date,
        total_duration_sec,
        by_posture,
    }
}
