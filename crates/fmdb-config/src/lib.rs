//! Shared configuration for the fmdb tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `fmdb_core::StoreConfig`. The older deployment
//! variables `DB_ADDRESS`, `DB_USERNAME` and `DB_PASSWORD` still work
//! when no profile is configured.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fmdb_core::config::{DEFAULT_BULK_LIMIT, DEFAULT_CASCADE_CONCURRENCY, DEFAULT_FIND_LIMIT};
use fmdb_core::{IdSchema, MissingTypePolicy, StoreConfig, StoreCredentials, TlsVerification};

const KEYRING_SERVICE: &str = "fmdb";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named store profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_find_limit")]
    pub find_limit: usize,

    #[serde(default = "default_bulk_limit")]
    pub bulk_limit: usize,

    #[serde(default = "default_cascade_concurrency")]
    pub cascade_concurrency: usize,

    #[serde(default)]
    pub missing_types: MissingTypePolicy,

    /// Separator between ID segments.
    #[serde(default = "default_delimiter")]
    pub id_delimiter: char,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            find_limit: default_find_limit(),
            bulk_limit: default_bulk_limit(),
            cascade_concurrency: default_cascade_concurrency(),
            missing_types: MissingTypePolicy::default(),
            id_delimiter: default_delimiter(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_find_limit() -> usize {
    DEFAULT_FIND_LIMIT
}
fn default_bulk_limit() -> usize {
    DEFAULT_BULK_LIMIT
}
fn default_cascade_concurrency() -> usize {
    DEFAULT_CASCADE_CONCURRENCY
}
fn default_delimiter() -> char {
    '-'
}

/// A named store profile. Unset fields fall back to `Defaults`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Store root URL (e.g., "https://couch.example.edu:6984").
    pub address: String,

    pub username: Option<String>,

    /// Password in plaintext. Prefer the keyring or an env var.
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,
    pub timeout: Option<u64>,
    pub find_limit: Option<usize>,
    pub bulk_limit: Option<usize>,
    pub cascade_concurrency: Option<usize>,
    pub missing_types: Option<MissingTypePolicy>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("edu", "fmdb", "fmdb").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fmdb");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file is not an
/// error; the defaults apply.
///
/// Environment overrides use `FMDB_` and a double underscore for nesting,
/// e.g. `FMDB_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("FMDB_")
                .split("__")
                .ignore(&["address", "username", "password", "profile"]),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick the profile named `requested`, or the config's default.
///
/// When the default profile is absent but `DB_ADDRESS` is set, a profile
/// is synthesized from the legacy `DB_*` variables.
pub fn select_profile(
    config: &Config,
    requested: Option<&str>,
) -> Result<(String, Profile), ConfigError> {
    select_profile_with(config, requested, &|key| std::env::var(key).ok())
}

fn select_profile_with(
    config: &Config,
    requested: Option<&str>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<(String, Profile), ConfigError> {
    let name = requested
        .or(config.default_profile.as_deref())
        .unwrap_or("default");

    if let Some(profile) = config.profiles.get(name) {
        return Ok((name.to_owned(), profile.clone()));
    }
    if requested.is_none() {
        if let Some(address) = env("FMDB_ADDRESS").or_else(|| env("DB_ADDRESS")) {
            debug!(%address, "using store address from environment");
            let profile = Profile {
                address,
                ..Profile::default()
            };
            return Ok((name.to_owned(), profile));
        }
    }
    Err(ConfigError::ProfileNotFound { name: name.into() })
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the credentials for a profile.
///
/// No username anywhere means the store is used unauthenticated. A
/// username with no password to go with it is an error.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<StoreCredentials>, ConfigError> {
    resolve_credentials_with(
        profile,
        profile_name,
        &|key| std::env::var(key).ok(),
        &keyring_password,
    )
}

fn keyring_password(profile_name: &str) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")).ok()?;
    entry.get_password().ok()
}

fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env: &dyn Fn(&str) -> Option<String>,
    keyring: &dyn Fn(&str) -> Option<String>,
) -> Result<Option<StoreCredentials>, ConfigError> {
    let Some(username) = profile
        .username
        .clone()
        .or_else(|| env("FMDB_USERNAME"))
        .or_else(|| env("DB_USERNAME"))
    else {
        return Ok(None);
    };

    // 1. Profile's password_env, then the well-known variables
    let from_env = profile
        .password_env
        .as_deref()
        .and_then(env)
        .or_else(|| env("FMDB_PASSWORD"))
        .or_else(|| env("DB_PASSWORD"));

    // 2. System keyring, 3. plaintext in config
    let password = from_env
        .or_else(|| keyring(profile_name))
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    Ok(Some(StoreCredentials {
        username,
        password: SecretString::from(password),
    }))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `StoreConfig` from a profile, filling gaps from `defaults`.
pub fn profile_to_store_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<StoreConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    build_store_config(profile, defaults, credentials)
}

fn build_store_config(
    profile: &Profile,
    defaults: &Defaults,
    credentials: Option<StoreCredentials>,
) -> Result<StoreConfig, ConfigError> {
    let url: url::Url = profile
        .address
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "address".into(),
            reason: format!("invalid URL: {}", profile.address),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let schema = IdSchema::new(defaults.id_delimiter).map_err(|e| ConfigError::Validation {
        field: "id_delimiter".into(),
        reason: e.to_string(),
    })?;

    let positive = |field: &str, value: usize| {
        if value == 0 {
            Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be at least 1".into(),
            })
        } else {
            Ok(value)
        }
    };

    Ok(StoreConfig {
        url,
        credentials,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        find_limit: positive("find_limit", profile.find_limit.unwrap_or(defaults.find_limit))?,
        bulk_limit: positive("bulk_limit", profile.bulk_limit.unwrap_or(defaults.bulk_limit))?,
        cascade_concurrency: positive(
            "cascade_concurrency",
            profile
                .cascade_concurrency
                .unwrap_or(defaults.cascade_concurrency),
        )?,
        missing_types: profile.missing_types.unwrap_or(defaults.missing_types),
        schema,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    fn no_keyring(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_profiles_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "campus"

[defaults]
find_limit = 200

[profiles.campus]
address = "https://couch.example.edu:6984"
username = "fmdb"
missing_types = "fail"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("campus"));
        assert_eq!(config.defaults.find_limit, 200);
        assert_eq!(config.defaults.bulk_limit, DEFAULT_BULK_LIMIT);

        let profile = &config.profiles["campus"];
        assert_eq!(profile.username.as_deref(), Some("fmdb"));
        assert_eq!(profile.missing_types, Some(MissingTypePolicy::Fail));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                address: "http://localhost:5984".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].timeout, Some(5));
    }

    #[test]
    fn test_legacy_address_fills_in_for_missing_default() {
        let env = vars(&[("DB_ADDRESS", "http://db.internal:5984")]);
        let (name, profile) = select_profile_with(&Config::default(), None, &env).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.address, "http://db.internal:5984");

        // An explicitly named profile never falls back.
        let err = select_profile_with(&Config::default(), Some("lab"), &env).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { .. }));
    }

    #[test]
    fn test_password_chain_order() {
        let profile = Profile {
            address: "http://localhost:5984".into(),
            username: Some("fmdb".into()),
            password: Some("plaintext".into()),
            password_env: Some("LAB_DB_SECRET".into()),
            ..Profile::default()
        };

        let env = vars(&[("LAB_DB_SECRET", "from-profile-env"), ("DB_PASSWORD", "legacy")]);
        let creds = resolve_credentials_with(&profile, "lab", &env, &no_keyring)
            .unwrap()
            .unwrap();
        assert_eq!(creds.password.expose_secret(), "from-profile-env");

        let env = vars(&[("DB_PASSWORD", "legacy")]);
        let creds = resolve_credentials_with(&profile, "lab", &env, &|_| Some("keyring".into()))
            .unwrap()
            .unwrap();
        assert_eq!(creds.password.expose_secret(), "legacy");

        let env = vars(&[]);
        let creds = resolve_credentials_with(&profile, "lab", &env, &|_| Some("keyring".into()))
            .unwrap()
            .unwrap();
        assert_eq!(creds.password.expose_secret(), "keyring");

        let creds = resolve_credentials_with(&profile, "lab", &env, &no_keyring)
            .unwrap()
            .unwrap();
        assert_eq!(creds.password.expose_secret(), "plaintext");
    }

    #[test]
    fn test_username_without_password_is_an_error() {
        let profile = Profile {
            address: "http://localhost:5984".into(),
            ..Profile::default()
        };
        let env = vars(&[("DB_USERNAME", "fmdb")]);
        let err = resolve_credentials_with(&profile, "default", &env, &no_keyring).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));

        let anonymous = resolve_credentials_with(&profile, "default", &vars(&[]), &no_keyring);
        assert!(anonymous.unwrap().is_none());
    }

    #[test]
    fn test_store_config_merges_defaults() {
        let profile = Profile {
            address: "https://couch.example.edu:6984".into(),
            ca_cert: Some(PathBuf::from("/etc/ssl/campus.pem")),
            cascade_concurrency: Some(8),
            ..Profile::default()
        };
        let defaults = Defaults {
            timeout: 10,
            ..Defaults::default()
        };

        let config = build_store_config(&profile, &defaults, None).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cascade_concurrency, 8);
        assert_eq!(config.find_limit, DEFAULT_FIND_LIMIT);
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/campus.pem"))
        );
    }

    #[test]
    fn test_store_config_rejects_bad_values() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            address: "not a url".into(),
            ..Profile::default()
        };
        assert!(build_store_config(&bad_url, &defaults, None).is_err());

        let zero = Profile {
            address: "http://localhost:5984".into(),
            find_limit: Some(0),
            ..Profile::default()
        };
        let err = build_store_config(&zero, &defaults, None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "find_limit"));

        let bad_delim = Defaults {
            id_delimiter: 'x',
            ..Defaults::default()
        };
        let ok = Profile {
            address: "http://localhost:5984".into(),
            ..Profile::default()
        };
        assert!(build_store_config(&ok, &bad_delim, None).is_err());
    }
}
