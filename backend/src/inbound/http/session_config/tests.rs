//! Unit tests for session configuration.

use super::*;
use actix_web::cookie::SameSite;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct KeyDir {
    dir: TempDir,
}

impl KeyDir {
    fn with_key(len: usize) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        crate::test_support::cap_fs::write_file(&dir.path().join("session_key"), &vec![b'k'; len])
            .expect("write key");
        Self { dir }
    }

    fn key_path(&self) -> PathBuf {
        self.dir.path().join("session_key")
    }

    fn missing_path(&self) -> PathBuf {
        self.dir.path().join("absent")
    }
}

#[fixture]
fn key_dir() -> KeyDir {
    KeyDir::with_key(SESSION_KEY_MIN_LEN)
}

fn toggles(key_file: PathBuf, same_site: &str) -> SessionToggles {
    SessionToggles {
        key_file,
        allow_ephemeral: false,
        cookie_secure: true,
        same_site: same_site.to_owned(),
    }
}

#[rstest]
#[case("Strict", SameSite::Strict)]
#[case("lax", SameSite::Lax)]
#[case(" NONE ", SameSite::None)]
fn release_accepts_a_full_key(key_dir: KeyDir, #[case] same_site: &str, #[case] expected: SameSite) {
    let settings = session_settings(&toggles(key_dir.key_path(), same_site), BuildMode::Release)
        .expect("valid settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, expected);
}

#[rstest]
fn the_key_is_derived_from_file_contents(key_dir: KeyDir) {
    let first = session_settings(&toggles(key_dir.key_path(), "Lax"), BuildMode::Release)
        .expect("valid settings");
    let second = session_settings(&toggles(key_dir.key_path(), "Lax"), BuildMode::Release)
        .expect("valid settings");

    assert_eq!(
        fingerprint::key_fingerprint(&first.key),
        fingerprint::key_fingerprint(&second.key)
    );
}

#[rstest]
fn release_rejects_a_short_key() {
    let key_dir = KeyDir::with_key(SESSION_KEY_MIN_LEN - 1);

    let result = session_settings(&toggles(key_dir.key_path(), "Strict"), BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length: 63, .. })
    ));
}

#[rstest]
fn debug_replaces_a_short_key() {
    let key_dir = KeyDir::with_key(8);

    let result = session_settings(&toggles(key_dir.key_path(), "Strict"), BuildMode::Debug);

    assert!(result.is_ok());
}

#[rstest]
fn release_rejects_a_missing_key(key_dir: KeyDir) {
    let result = session_settings(&toggles(key_dir.missing_path(), "Strict"), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
}

#[rstest]
fn debug_generates_a_key_when_missing(key_dir: KeyDir) {
    let result = session_settings(&toggles(key_dir.missing_path(), "Strict"), BuildMode::Debug);

    assert!(result.is_ok());
}

#[rstest]
fn release_rejects_ephemeral_keys(key_dir: KeyDir) {
    let mut toggles = toggles(key_dir.key_path(), "Strict");
    toggles.allow_ephemeral = true;

    let result = session_settings(&toggles, BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
}

#[rstest]
fn debug_honours_ephemeral_keys(key_dir: KeyDir) {
    let mut toggles = toggles(key_dir.missing_path(), "Strict");
    toggles.allow_ephemeral = true;

    assert!(session_settings(&toggles, BuildMode::Debug).is_ok());
}

#[rstest]
#[case(BuildMode::Release, false)]
#[case(BuildMode::Debug, true)]
fn same_site_none_needs_secure_cookies(
    key_dir: KeyDir,
    #[case] mode: BuildMode,
    #[case] accepted: bool,
) {
    let mut toggles = toggles(key_dir.key_path(), "None");
    toggles.cookie_secure = false;

    let result = session_settings(&toggles, mode);

    assert_eq!(result.is_ok(), accepted);
    if !accepted {
        assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
    }
}

#[rstest]
fn release_rejects_unknown_same_site(key_dir: KeyDir) {
    let result = session_settings(&toggles(key_dir.key_path(), "sideways"), BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::InvalidSetting {
            name: "session_same_site",
            ..
        })
    ));
}

#[rstest]
fn debug_defaults_unknown_same_site_to_lax(key_dir: KeyDir) {
    let settings = session_settings(&toggles(key_dir.key_path(), "sideways"), BuildMode::Debug)
        .expect("debug tolerates unknown values");

    assert_eq!(settings.same_site, SameSite::Lax);
}
