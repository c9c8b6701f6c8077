//! PostgreSQL-backed credential lookup for password login.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{StoredCredentials, UserCredentialsError, UserCredentialsRepository};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::CredentialRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of [`UserCredentialsRepository`].
#[derive(Clone)]
pub struct DieselUserCredentialsRepository {
    pool: DbPool,
}

impl DieselUserCredentialsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserCredentialsRepository for DieselUserCredentialsRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserCredentialsError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, UserCredentialsError::connection))?;
        let row: Option<CredentialRow> = users::table
            .filter(users::username.eq(username))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| {
                map_basic_diesel_error(
                    error,
                    "credential lookup",
                    UserCredentialsError::query,
                    UserCredentialsError::connection,
                )
            })?;
        Ok(row.map(|row| StoredCredentials {
            user_id: UserId::from_uuid(row.id),
            salt: row.password_salt,
            password_hash: row.password_hash,
        }))
    }
}
