//! Password authentication against stored salted digests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::auth::{LoginCredentials, password_matches};
use super::ports::{LoginService, UserCredentialsError, UserCredentialsRepository};
use super::{Error, UserId};

/// [`LoginService`] comparing SHA-256 digests of `salt || password`.
#[derive(Clone)]
pub struct PasswordLoginService {
    credentials: Arc<dyn UserCredentialsRepository>,
}

impl PasswordLoginService {
    /// Build a service over a credential store.
    pub fn new(credentials: Arc<dyn UserCredentialsRepository>) -> Self {
        Self { credentials }
    }
}

fn map_credentials_error(error: UserCredentialsError) -> Error {
    warn!(error = %error, "credential lookup failed");
    match error {
        UserCredentialsError::Connection { .. } => {
            Error::service_unavailable("user store unavailable")
        }
        UserCredentialsError::Query { message } => {
            Error::internal(format!("credential lookup failed: {message}"))
        }
    }
}

#[async_trait]
impl LoginService for PasswordLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .credentials
            .find_by_username(credentials.username())
            .await
            .map_err(map_credentials_error)?;

        match stored {
            Some(stored)
                if password_matches(&stored.salt, credentials.password(), &stored.password_hash) =>
            {
                Ok(stored.user_id)
            }
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
