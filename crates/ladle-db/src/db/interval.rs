//! Duration to Postgres INTERVAL mapping.
//!
//! The pipeline writes pure-microsecond intervals; day and month components
//! only appear in rows written by other tools, so decoding folds them in.

use sqlx::postgres::types::PgInterval;
use std::time::Duration;

const MICROS_PER_DAY: i64 = 86_400_000_000;
const DAYS_PER_MONTH: i64 = 30;

/// Encode a duration as a Postgres interval.
pub fn interval_from_duration(duration: Duration) -> PgInterval {
    PgInterval {
        months: 0,
        days: 0,
        microseconds: i64::try_from(duration.as_micros()).unwrap_or(i64::MAX),
    }
}

/// Decode a Postgres interval into a duration. Negative totals clamp to
/// zero; months count as thirty days.
pub fn duration_from_interval(interval: &PgInterval) -> Duration {
    let days = i64::from(interval.days) + i64::from(interval.months) * DAYS_PER_MONTH;
    let micros = interval
        .microseconds
        .saturating_add(days.saturating_mul(MICROS_PER_DAY));
    Duration::from_micros(micros.max(0) as u64)
}
