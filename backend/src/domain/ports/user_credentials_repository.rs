//! Driven port for looking up stored login credentials.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential lookups.
    pub enum UserCredentialsError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
    }
}

/// Salted password digest stored for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Owning user.
    pub user_id: UserId,
    /// Per-user salt prepended to the password.
    pub salt: String,
    /// Hex SHA-256 of `salt || password`.
    pub password_hash: String,
}

/// Port for credential lookup by username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCredentialsRepository: Send + Sync {
    /// Stored credentials for `username`, if the user exists.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserCredentialsError>;
}
