//! Error handling for storefront-store
//!
//! Wraps storefront-core ExError with store-specific helpers

use storefront_core::errors::{ExError, ExErrorKind, StorefrontError};
use storefront_core::model::EntityKind;

pub use storefront_core::errors::Result;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::DataAccess)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// SQLite constraint failures (UNIQUE, FOREIGN KEY, CHECK, RAISE in a
/// trigger) become `ConstraintViolation`; everything else is `DataAccess`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::DataAccess,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Point lookup matched no row
pub fn not_found(kind: EntityKind, id: impl Into<i64>) -> ExError {
    StorefrontError::NotFound {
        kind,
        id: id.into(),
    }
    .into()
}

/// A column held a value of the wrong shape
pub fn bad_column(column: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::DataAccess)
        .with_op("read_column")
        .with_message(format!("column '{}': {}", column, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_constraint() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER UNIQUE); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)", []).unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_syntax_error_maps_to_data_access() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute("SELEC 1", []).unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::DataAccess);
    }

    #[test]
    fn test_not_found_helper() {
        let err = not_found(EntityKind::Wishlist, 9);
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entity_kind(), Some("wishlist"));
    }
}
