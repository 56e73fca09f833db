//! Staleness policy for mirrored record collections.
//!
//! A collection is stale when it is empty (forces initial population) or when
//! any record's last-updated timestamp has aged past the configured maximum.
//! The check is pure; callers inject `now` where they need determinism.

use chrono::{DateTime, Duration, Utc};

/// Anything carrying a last-updated timestamp from the store.
pub trait Timestamped {
    fn last_updated(&self) -> DateTime<Utc>;
}

/// Whether `records` need a refresh from upstream, judged at `now`.
pub fn is_stale_at<T: Timestamped>(records: &[T], max_age: Duration, now: DateTime<Utc>) -> bool {
    if records.is_empty() {
        return true;
    }
    let threshold = now - max_age;
    records.iter().any(|r| r.last_updated() <= threshold)
}

/// [`is_stale_at`] judged at the current wall-clock time.
pub fn is_stale<T: Timestamped>(records: &[T], max_age: Duration) -> bool {
    is_stale_at(records, max_age, Utc::now())
}
