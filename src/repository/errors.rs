//! Failures surfaced by the Diesel repository.

use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    /// A unique index rejected the row, e.g. a second client with the same
    /// e-mail in one hub or a reused legacy code.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// The row points at a client, employee, visit or deal that is gone.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored or submitted value does not satisfy the domain types.
    #[error("invalid value: {0}")]
    ValidationError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Strips SQLite's "<KIND> constraint failed: " prefix, leaving the columns.
fn constraint_target(message: &str) -> String {
    message
        .split_once("constraint failed: ")
        .map_or(message, |(_, columns)| columns)
        .to_string()
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message();
                match kind {
                    DatabaseErrorKind::UniqueViolation => {
                        RepositoryError::Duplicate(constraint_target(message))
                    }
                    DatabaseErrorKind::ForeignKeyViolation => {
                        RepositoryError::MissingReference(constraint_target(message))
                    }
                    DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
                        RepositoryError::ConstraintViolation(constraint_target(message))
                    }
                    _ => RepositoryError::DatabaseError(message.to_string()),
                }
            }
            DieselError::SerializationError(e) | DieselError::DeserializationError(e) => {
                RepositoryError::ValidationError(e.to_string())
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_string()))
    }

    #[test]
    fn unique_violations_name_the_columns() {
        let err = RepositoryError::from(sqlite_error(
            DatabaseErrorKind::UniqueViolation,
            "UNIQUE constraint failed: clients.hub_id, clients.email",
        ));
        assert!(matches!(
            &err,
            RepositoryError::Duplicate(columns) if columns == "clients.hub_id, clients.email"
        ));
        assert_eq!(err.to_string(), "duplicate clients.hub_id, clients.email");
    }

    #[test]
    fn foreign_key_violations_are_missing_references() {
        let err = RepositoryError::from(sqlite_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "FOREIGN KEY constraint failed",
        ));
        assert!(matches!(err, RepositoryError::MissingReference(_)));
    }

    #[test]
    fn check_violations_stay_generic() {
        let err = RepositoryError::from(sqlite_error(
            DatabaseErrorKind::CheckViolation,
            "CHECK constraint failed: amount_cents > 0",
        ));
        assert!(matches!(
            err,
            RepositoryError::ConstraintViolation(rule) if rule == "amount_cents > 0"
        ));
    }

    #[test]
    fn missing_rows_are_not_found() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }
}
