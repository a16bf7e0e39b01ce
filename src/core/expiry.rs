//! Key expiry parsing and staleness checks.

use crate::constants;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Parse an expiry value in `YYYY-MM-DD` form.
pub fn parse_expiry(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, constants::DATE_FORMAT)
        .with_context(|| format!("invalid expiry date '{}', expected YYYY-MM-DD", value))
}

/// Whether a key recorded to expire on `expires_at` should be flagged stale.
///
/// Stale only once `now` is strictly more than 24 hours past midnight UTC of
/// the expiry date; the grace window absorbs clock and timezone skew right at
/// the boundary. A missing expiry date is never stale; callers skip the
/// check entirely.
pub fn is_stale(expires_at: NaiveDate, now: DateTime<Utc>) -> bool {
    let expiry = expires_at.and_time(NaiveTime::MIN).and_utc();
    now > expiry + Duration::hours(constants::EXPIRY_GRACE_HOURS)
}
