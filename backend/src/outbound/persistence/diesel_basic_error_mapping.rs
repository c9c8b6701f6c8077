//! Shared Diesel error mapping for repositories and the spatial source.
//!
//! Lock contention is recognised from the SQLSTATE class (serialisation
//! failure) or from the server message, since PostgreSQL reports
//! `lock_not_available` and deadlocks under the generic kind.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::SpatialQueryError;

use super::pool::PoolError;

const LOCK_MARKERS: [&str; 6] = [
    "database is locked",
    "deadlock detected",
    "could not obtain lock",
    "lock not available",
    "lock timeout",
    "could not serialize access",
];

/// Extract a readable message from a pool error.
pub fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(pool_error_message(error))
}

fn log_failure(error: &DieselError, operation: &str) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(error = %error, %operation, "diesel operation failed"),
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub fn map_basic_diesel_error<E, Q, C>(
    error: DieselError,
    operation: &str,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    log_failure(&error, operation);
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection(format!("{operation}: database connection error"))
        }
        DieselError::NotFound => query(format!("{operation}: record not found")),
        other => query(format!("{operation}: {other}")),
    }
}

/// Whether a Diesel error reports transient lock contention.
pub fn is_lock_contention(error: &DieselError) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => true,
        DieselError::DatabaseError(_, info) => {
            let message = info.message().to_lowercase();
            LOCK_MARKERS.iter().any(|marker| message.contains(marker))
        }
        _ => false,
    }
}

/// Map a Diesel error from a spatial query into the spatial port's error.
pub fn map_spatial_error(error: DieselError, operation: &str) -> SpatialQueryError {
    if is_lock_contention(&error) {
        log_failure(&error, operation);
        return SpatialQueryError::locked(format!("{operation}: {error}"));
    }
    map_basic_diesel_error(
        error,
        operation,
        SpatialQueryError::query,
        SpatialQueryError::connection,
    )
}
