//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `LOCAAI_*` environment variables over the
//! config file. Optional fields resolve their defaults through the accessor
//! methods so callers never see a half-parsed value.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{ContractPolicy, ContractPolicyParseError, LockRetryPolicy};
use crate::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_GEOCODER_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MODEL_PATH: &str = "models/survival_model.json";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_SAME_SITE: &str = "Lax";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("missing required setting {name}")]
    Missing { name: &'static str },
    /// The bind address did not parse.
    #[error("invalid bind_addr '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The geocoder endpoint did not parse.
    #[error("invalid geocoder_endpoint '{value}': {source}")]
    GeocoderEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// The feature contract policy is unknown.
    #[error(transparent)]
    FeatureContract(#[from] ContractPolicyParseError),
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOCAAI")]
pub struct Settings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL of the PostGIS database.
    pub database_url: Option<String>,
    /// Pool size.
    pub db_max_connections: Option<u32>,
    /// Override for the Kakao address search endpoint.
    pub geocoder_endpoint: Option<String>,
    /// Kakao REST API key.
    pub geocoder_api_key: Option<String>,
    /// Geocoder request timeout in milliseconds.
    pub geocoder_timeout_ms: Option<u64>,
    /// XGBoost JSON model export.
    pub model_path: Option<PathBuf>,
    /// `auto`, `full` or `reduced`.
    pub feature_contract: Option<String>,
    /// Aggregation attempts including the first.
    #[ortho_config(default = 3)]
    pub lock_retry_attempts: u32,
    /// Delay before the first retry; doubles afterwards.
    #[ortho_config(default = 100)]
    pub lock_retry_initial_backoff_ms: u64,
    /// Session key material.
    pub session_key_file: Option<PathBuf>,
    /// Generate a session key when the file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
    /// Apply embedded migrations before serving.
    pub run_migrations: Option<bool>,
}

impl Settings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL; required.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                name: "database_url",
            })
    }

    /// Pool size, defaulting to 10.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Geocoder API key; required.
    pub fn geocoder_api_key(&self) -> Result<&str, SettingsError> {
        self.geocoder_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::Missing {
                name: "geocoder_api_key",
            })
    }

    /// Parsed endpoint override, if any.
    pub fn geocoder_endpoint(&self) -> Result<Option<Url>, SettingsError> {
        self.geocoder_endpoint
            .as_deref()
            .map(|value| {
                Url::parse(value).map_err(|source| SettingsError::GeocoderEndpoint {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Geocoder timeout, defaulting to five seconds.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_millis(
            self.geocoder_timeout_ms
                .unwrap_or(DEFAULT_GEOCODER_TIMEOUT_MS),
        )
    }

    /// Model path, defaulting to `models/survival_model.json`.
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    /// Contract policy, defaulting to `auto`.
    pub fn feature_contract(&self) -> Result<ContractPolicy, SettingsError> {
        match self.feature_contract.as_deref() {
            Some(value) => Ok(value.parse()?),
            None => Ok(ContractPolicy::default()),
        }
    }

    /// Lock retry policy; at least one attempt is always made.
    pub fn lock_retry(&self) -> LockRetryPolicy {
        LockRetryPolicy {
            max_attempts: self.lock_retry_attempts.max(1),
            initial_backoff: Duration::from_millis(self.lock_retry_initial_backoff_ms),
        }
    }

    /// Whether session cookies carry `Secure`, defaulting to true.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Whether an unreadable key file may be replaced by a generated key.
    pub fn session_allow_ephemeral(&self) -> bool {
        self.session_allow_ephemeral.unwrap_or(false)
    }

    /// Whether embedded migrations run at startup, defaulting to false.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(false)
    }

    /// Session toggles for [`crate::inbound::http::session_config`].
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE)),
            allow_ephemeral: self.session_allow_ephemeral(),
            cookie_secure: self.cookie_secure(),
            same_site: self
                .session_same_site
                .clone()
                .unwrap_or_else(|| DEFAULT_SAME_SITE.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 15] = [
        "LOCAAI_BIND_ADDR",
        "LOCAAI_DATABASE_URL",
        "LOCAAI_DB_MAX_CONNECTIONS",
        "LOCAAI_GEOCODER_ENDPOINT",
        "LOCAAI_GEOCODER_API_KEY",
        "LOCAAI_GEOCODER_TIMEOUT_MS",
        "LOCAAI_MODEL_PATH",
        "LOCAAI_FEATURE_CONTRACT",
        "LOCAAI_LOCK_RETRY_ATTEMPTS",
        "LOCAAI_LOCK_RETRY_INITIAL_BACKOFF_MS",
        "LOCAAI_SESSION_KEY_FILE",
        "LOCAAI_SESSION_ALLOW_EPHEMERAL",
        "LOCAAI_COOKIE_SECURE",
        "LOCAAI_SESSION_SAME_SITE",
        "LOCAAI_RUN_MIGRATIONS",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> Settings {
        Settings::load_from_iter([OsString::from("locaai")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal addr")
        );
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.geocoder_timeout(), Duration::from_secs(5));
        assert_eq!(settings.model_path(), PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(
            settings.feature_contract().expect("default policy"),
            ContractPolicy::Auto
        );
        assert_eq!(settings.lock_retry(), LockRetryPolicy::default());
        assert!(settings.cookie_secure());
        assert!(!settings.session_allow_ephemeral());
        assert!(!settings.run_migrations());
        assert!(settings.session_toggles().cookie_secure);
        assert_eq!(settings.session_toggles().same_site, "Lax");
    }

    #[rstest]
    fn required_values_report_their_name() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();

        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing {
                name: "database_url"
            })
        ));
        assert!(matches!(
            settings.geocoder_api_key(),
            Err(SettingsError::Missing {
                name: "geocoder_api_key"
            })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("LOCAAI_BIND_ADDR", "127.0.0.1:9000"),
            ("LOCAAI_DATABASE_URL", "postgres://gis@db/locaai"),
            ("LOCAAI_GEOCODER_API_KEY", "kakao-key"),
            ("LOCAAI_GEOCODER_TIMEOUT_MS", "1500"),
            ("LOCAAI_FEATURE_CONTRACT", "reduced"),
            ("LOCAAI_LOCK_RETRY_ATTEMPTS", "5"),
            ("LOCAAI_LOCK_RETRY_INITIAL_BACKOFF_MS", "250"),
            ("LOCAAI_COOKIE_SECURE", "false"),
            ("LOCAAI_RUN_MIGRATIONS", "true"),
        ]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("addr").to_string(),
            "127.0.0.1:9000"
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://gis@db/locaai"
        );
        assert_eq!(settings.geocoder_api_key().expect("key"), "kakao-key");
        assert_eq!(settings.geocoder_timeout(), Duration::from_millis(1500));
        assert_eq!(
            settings.feature_contract().expect("policy"),
            ContractPolicy::Reduced
        );
        assert_eq!(
            settings.lock_retry(),
            LockRetryPolicy {
                max_attempts: 5,
                initial_backoff: Duration::from_millis(250),
            }
        );
        assert!(!settings.cookie_secure());
        assert!(settings.run_migrations());
        assert!(!settings.session_toggles().cookie_secure);
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn ephemeral_session_keys_follow_the_environment(#[case] value: &str, #[case] expected: bool) {
        let _guard = lock_env(env_with(&[("LOCAAI_SESSION_ALLOW_EPHEMERAL", value)]));

        let settings = load();

        assert_eq!(settings.session_allow_ephemeral(), expected);
        assert_eq!(settings.session_toggles().allow_ephemeral, expected);
    }

    #[rstest]
    #[case("LOCAAI_BIND_ADDR", "localhost")]
    #[case("LOCAAI_GEOCODER_ENDPOINT", "not a url")]
    #[case("LOCAAI_FEATURE_CONTRACT", "partial")]
    fn malformed_values_are_errors(#[case] name: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(name, value)]));

        let settings = load();

        let failed = settings.bind_addr().is_err()
            || settings.geocoder_endpoint().is_err()
            || settings.feature_contract().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }

    #[rstest]
    fn zero_retry_attempts_still_runs_once() {
        let _guard = lock_env(env_with(&[("LOCAAI_LOCK_RETRY_ATTEMPTS", "0")]));

        assert_eq!(load().lock_retry().max_attempts, 1);
    }
}
