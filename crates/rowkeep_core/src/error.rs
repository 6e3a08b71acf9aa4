//! Closed failure taxonomy for facade operations.
//!
//! # Responsibility
//! - Define the five failure kinds every facade call can produce.
//! - Decide whether an opaque store fault passes through or gets wrapped.
//!
//! # Invariants
//! - Failures are values returned in `Err`, never panics.
//! - A fault that is already a `StorageError` is never re-wrapped.
//! - Validation variants carry every issue, not just the first.

use chrono::{DateTime, SecondsFormat, Utc};
use std::error::Error;

/// Opaque fault raised by a store implementation.
pub type StoreFault = Box<dyn Error + Send + Sync + 'static>;

/// Result alias used by every facade operation.
pub type StorageResult<T> = Result<T, StorageError>;

/// Discriminant tag of a [`StorageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Db,
    DbValidation,
    NotFound,
    TtlExpired,
}

impl ErrorKind {
    /// Stable tag name, used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Db => "DbError",
            Self::DbValidation => "DbValidationError",
            Self::NotFound => "NotFoundError",
            Self::TtlExpired => "TtlExpiredError",
        }
    }
}

/// Failure produced by the CRUD facade.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Input was rejected by the insert schema.
    #[error("Validation failed: {}", .issues.join(", "))]
    Validation { issues: Vec<String> },

    /// The store call itself failed.
    #[error("{message}")]
    Db {
        message: String,
        #[source]
        cause: Option<StoreFault>,
    },

    /// A stored row was rejected by the select schema.
    #[error("Database record failed schema validation: {}", .issues.join(", "))]
    DbValidation { issues: Vec<String> },

    /// No row carries the requested identity.
    #[error("Record with id {id} not found")]
    NotFound { id: i64 },

    /// The row exists but its time-to-live has elapsed.
    #[error("Record TTL expired at {}", .expired_at.to_rfc3339_opts(SecondsFormat::Millis, true))]
    TtlExpired { expired_at: DateTime<Utc> },
}

impl StorageError {
    pub fn validation(issues: Vec<String>) -> Self {
        Self::Validation { issues }
    }

    pub fn db(message: impl Into<String>, cause: Option<StoreFault>) -> Self {
        Self::Db {
            message: message.into(),
            cause,
        }
    }

    pub fn db_validation(issues: Vec<String>) -> Self {
        Self::DbValidation { issues }
    }

    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn ttl_expired(expired_at: DateTime<Utc>) -> Self {
        Self::TtlExpired { expired_at }
    }

    /// Maps a raw store fault into the taxonomy.
    ///
    /// A fault that already is a `StorageError` is returned unchanged; any
    /// other fault becomes `Db { message, cause }`.
    pub fn from_fault(message: &str, fault: StoreFault) -> Self {
        match fault.downcast::<StorageError>() {
            Ok(known) => *known,
            Err(other) => Self::db(message, Some(other)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Db { .. } => ErrorKind::Db,
            Self::DbValidation { .. } => ErrorKind::DbValidation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TtlExpired { .. } => ErrorKind::TtlExpired,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Issue list for the two validation variants, empty otherwise.
    pub fn issues(&self) -> &[String] {
        match self {
            Self::Validation { issues } | Self::DbValidation { issues } => issues,
            _ => &[],
        }
    }
}

/// Returns whether an opaque fault belongs to the taxonomy.
pub fn is_storage_error(fault: &(dyn Error + 'static)) -> bool {
    fault.is::<StorageError>()
}
