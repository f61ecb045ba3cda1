//! Shared configuration for crmdesk.
//!
//! TOML profiles, environment overrides, and the durable session store a
//! profile selects. Translates a profile into a `crmdesk_api::ClientConfig`;
//! the CLI layers its global flags on top.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crmdesk_api::{
    ClientConfig, DEFAULT_BASE_URL, FileSessionStore, SessionStore, TlsMode, TransportConfig, User,
};

const KEYRING_SERVICE: &str = "crmdesk";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
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

impl Config {
    /// Name of the profile to use: the explicit request, then
    /// `default_profile`, then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned()
    }

    /// The named profile. `"default"` falls back to built-in settings
    /// when the file does not define it.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile keeps its bearer token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    /// JSON file in the platform data dir.
    #[default]
    File,
    /// OS keyring, with the login user in a sidecar file.
    Keyring,
}

/// A named API profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "https://api.example.com/api").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Email to pre-fill at login.
    pub email: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    #[serde(default)]
    pub token_storage: TokenStorage,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            email: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            token_storage: TokenStorage::File,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "crmdesk", "crmdesk")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("crmdesk");
    p
}

/// Session file for a profile.
pub fn session_path(profile_name: &str) -> PathBuf {
    data_dir().join("sessions").join(format!("{profile_name}.json"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. Environment variables prefixed `CRMDESK_`
/// override file values; nested keys use `__` (`CRMDESK_DEFAULTS__OUTPUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CRMDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        debug!(error = %e, "using default config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to api config ───────────────────────────────────────

/// Build a `ClientConfig` from a profile, no CLI flag overrides.
pub fn profile_to_client_config(profile: &Profile) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));

    Ok(ClientConfig {
        base_url,
        transport: TransportConfig { tls, timeout },
    })
}

/// The session store a profile selects.
pub fn session_store(profile_name: &str, profile: &Profile) -> Arc<dyn SessionStore> {
    let path = session_path(profile_name);
    match profile.token_storage {
        TokenStorage::File => Arc::new(FileSessionStore::new(path)),
        TokenStorage::Keyring => Arc::new(KeyringSessionStore::new(profile_name, path)),
    }
}

// ── Keyring-backed session ──────────────────────────────────────────

/// Token in the OS keyring; the login user in a sidecar JSON file.
pub struct KeyringSessionStore {
    account: String,
    sidecar: FileSessionStore,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str, sidecar: impl Into<PathBuf>) -> Self {
        Self {
            account: format!("{profile_name}/token"),
            sidecar: FileSessionStore::new(sidecar),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, crmdesk_api::Error> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account).map_err(keyring_error)
    }
}

fn keyring_error(err: keyring::Error) -> crmdesk_api::Error {
    crmdesk_api::Error::Session(format!("keyring: {err}"))
}

impl fmt::Debug for KeyringSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringSessionStore")
            .field("account", &self.account)
            .field("sidecar", &self.sidecar.path())
            .finish()
    }
}

impl SessionStore for KeyringSessionStore {
    fn token(&self) -> Option<SecretString> {
        match self.entry().and_then(|e| e.get_password().map_err(keyring_error)) {
            Ok(secret) => Some(SecretString::from(secret)),
            Err(e) => {
                debug!(account = %self.account, error = %e, "no keyring token");
                None
            }
        }
    }

    fn set_token(&self, token: SecretString) -> Result<(), crmdesk_api::Error> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(keyring_error)
    }

    fn clear_token(&self) -> Result<(), crmdesk_api::Error> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(keyring_error(e)),
        }
        self.sidecar.clear_token()
    }

    fn user(&self) -> Option<User> {
        self.sidecar.user()
    }

    fn set_user(&self, user: &User) -> Result<(), crmdesk_api::Error> {
        self.sidecar.set_user(user)
    }
}
