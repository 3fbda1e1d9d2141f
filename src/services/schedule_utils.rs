use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::block::{BlockKey, TimeBlock};

/// An event occupies a block when it overlaps it by at least this many minutes.
pub const OCCUPANCY_THRESHOLD_MINUTES: f64 = 15.0;

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        AppError::validation_with_details(
            "invalid date, expected YYYY-MM-DD",
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The four fixed blocks of `date`, always in B1..B4 order.
pub fn blocks_for_day(date: NaiveDate) -> [TimeBlock; 4] {
    BlockKey::ALL.map(|key| TimeBlock {
        key,
        label: key.label(),
        start: date.and_time(key.start_time()),
        end: date.and_time(key.end_time()),
    })
}

/// Length of the intersection of two intervals in minutes, zero when disjoint.
pub fn overlap_minutes(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> f64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end <= start {
        return 0.0;
    }
    let millis = end.signed_duration_since(start).num_milliseconds();
    (millis as f64 / 60_000.0).max(0.0)
}

pub fn occupies(event_start: NaiveDateTime, event_end: NaiveDateTime, block: &TimeBlock) -> bool {
    overlap_minutes(event_start, event_end, block.start, block.end) >= OCCUPANCY_THRESHOLD_MINUTES
}

/// Blocks of `date` the interval occupies.
pub fn occupied_blocks(
    date: NaiveDate,
    event_start: NaiveDateTime,
    event_end: NaiveDateTime,
) -> Vec<BlockKey> {
    blocks_for_day(date)
        .iter()
        .filter(|block| occupies(event_start, event_end, block))
        .map(|block| block.key)
        .collect()
}
