//! Time-to-live evaluation for stored rows.
//!
//! # Responsibility
//! - Describe per-table TTL as a fixed duration or a per-row callback.
//! - Compute the expiry instant of a row from its timestamp column.
//!
//! # Invariants
//! - TTL is a read-time predicate; rows are never deleted here.
//! - A row without a temporal timestamp, or whose callback returns `None`,
//!   never expires.
//! - A row is expired only when `now > timestamp + duration` (strictly).

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Timestamp column used when a facade does not configure one.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "created_at";

/// Creation instant held by a row's timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    Millis(i64),
    DateTime(DateTime<Utc>),
}

impl Timestamp {
    pub fn as_millis(self) -> i64 {
        match self {
            Self::Millis(ms) => ms,
            Self::DateTime(at) => at.timestamp_millis(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// A row whose named fields can be read as timestamps.
pub trait TableRow {
    /// Returns the value of `column` when it holds a temporal value.
    fn timestamp(&self, column: &str) -> Option<Timestamp>;
}

/// Untyped records expose integer millis and RFC 3339 strings as timestamps.
impl TableRow for Map<String, Value> {
    fn timestamp(&self, column: &str) -> Option<Timestamp> {
        match self.get(column)? {
            Value::Number(number) => number.as_i64().map(Timestamp::Millis),
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|at| Timestamp::DateTime(at.with_timezone(&Utc))),
            _ => None,
        }
    }
}

type TtlCallback<R> = Arc<dyn Fn(&R) -> Option<i64> + Send + Sync>;

/// TTL policy bound to one facade.
pub enum Ttl<R> {
    /// Every row expires this many milliseconds after its timestamp.
    Fixed(i64),
    /// Duration computed per row; `None` means the row never expires.
    Callback(TtlCallback<R>),
}

impl<R> Ttl<R> {
    pub fn fixed(duration_ms: i64) -> Self {
        Self::Fixed(duration_ms)
    }

    pub fn callback(callback: impl Fn(&R) -> Option<i64> + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(callback))
    }

    /// Duration for `row` in milliseconds, `None` when it never expires.
    pub fn duration_for(&self, row: &R) -> Option<i64> {
        match self {
            Self::Fixed(ms) => Some(*ms),
            Self::Callback(callback) => callback(row),
        }
    }
}

impl<R> Clone for Ttl<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(ms) => Self::Fixed(*ms),
            Self::Callback(callback) => Self::Callback(Arc::clone(callback)),
        }
    }
}

impl<R> fmt::Debug for Ttl<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(ms) => f.debug_tuple("Fixed").field(ms).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Expiry instant of `row`, `None` when it never expires.
///
/// An expiry beyond the representable range saturates to "never".
pub fn expires_at<R: TableRow>(row: &R, ttl: &Ttl<R>, column: &str) -> Option<DateTime<Utc>> {
    let created = row.timestamp(column)?.as_millis();
    let duration = ttl.duration_for(row)?;
    created
        .checked_add(duration)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Returns whether `row` is logically expired at `now_ms`.
pub fn is_expired<R: TableRow>(row: &R, ttl: &Ttl<R>, column: &str, now_ms: i64) -> bool {
    expires_at(row, ttl, column).is_some_and(|at| now_ms > at.timestamp_millis())
}

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic expiry checks.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicI64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
