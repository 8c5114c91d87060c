//! Mapping backend failures onto [`StoreError`].

use std::sync::PoisonError;

use rusqlite::ErrorCode;
use thiserror::Error;

use glosor_core::error::StoreError;

/// Rows that violate the schema's enum tables.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("unknown part of speech id {0}")]
    PartOfSpeech(i64),

    #[error("unknown word category id {0}")]
    WordCategory(i64),

    #[error("timestamp out of range: {0} ms")]
    Timestamp(i64),
}

impl From<RowError> for StoreError {
    fn from(err: RowError) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Classify a SQLite error. Busy and locked databases are transient.
pub fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                StoreError::Unavailable(err.to_string())
            }
            ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::ReadOnly => StoreError::Io(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        },
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(err.to_string()),
        _ => StoreError::Database(err.to_string()),
    }
}

/// `?`-friendly conversion for rusqlite results.
pub(crate) trait SqliteResultExt<T> {
    fn store_err(self) -> Result<T, StoreError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn store_err(self) -> Result<T, StoreError> {
        self.map_err(classify)
    }
}

pub(crate) fn lock_err<G>(err: PoisonError<G>) -> StoreError {
    StoreError::Lock(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn busy_database_is_transient() {
        let err = classify(failure(rusqlite::ffi::SQLITE_BUSY));
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn constraint_violation_is_not_transient() {
        let err = classify(failure(rusqlite::ffi::SQLITE_CONSTRAINT));
        assert!(matches!(err, StoreError::Database(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_row_is_not_found() {
        assert!(matches!(
            classify(rusqlite::Error::QueryReturnedNoRows),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn bad_enum_ids_become_database_errors() {
        let err: StoreError = RowError::PartOfSpeech(42).into();
        assert!(err.to_string().contains("42"));
    }
}
