//! Login credentials and salted password digests.
//!
//! Inbound payload parsing stays outside the domain: handlers build
//! [`LoginCredentials`] and hand them to a [`crate::domain::ports::LoginService`].

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use locaai::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("owner", "secret").unwrap();
/// assert_eq!(creds.username(), "owner");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] for blank fields.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Hex-encoded SHA-256 digest of `salt || password`.
#[must_use]
pub fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a password against a stored digest without early exit.
#[must_use]
pub fn password_matches(salt: &str, password: &str, stored_digest: &str) -> bool {
    let computed = password_digest(salt, password);
    let stored = stored_digest.trim().to_ascii_lowercase();
    if computed.len() != stored.len() {
        return false;
    }
    computed
        .bytes()
        .zip(stored.bytes())
        .fold(0_u8, |acc, (lhs, rhs)| acc | (lhs ^ rhs))
        == 0
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_credentials_trim_username() {
        let creds = LoginCredentials::try_from_parts("  owner  ", " secret ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), "owner");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    fn digest_is_salted_sha256_hex() {
        // sha256("abc")
        assert_eq!(
            password_digest("a", "bc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[rstest]
    #[case("bc", true)]
    #[case("bd", false)]
    #[case("", false)]
    fn matches_only_the_original_password(#[case] password: &str, #[case] expected: bool) {
        let stored = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
        assert_eq!(password_matches("a", password, stored), expected);
    }
}
