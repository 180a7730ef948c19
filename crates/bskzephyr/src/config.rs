//! CLI-owned configuration: TOML profiles, credential resolution, and
//! translation into a ready-to-use `ZephyrClient`.
//!
//! The API crate never sees these types -- it receives a built client.

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
use tracing::{debug, warn};
use url::Url;

use bskzephyr_api::{SpeedTable, TransportConfig, ZephyrClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Service name for every keyring entry the CLI owns.
pub const KEYRING_SERVICE: &str = "bskzephyr";

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when --profile is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
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
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// One BSK account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout override, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Raw speed codes for this account's firmware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speeds: Option<SpeedTable>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tr", "bsk", "zephyr").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("zephyr");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ───────────────────────────────────────────────────

/// Load config from `path`, layered over defaults and `ZEPHYR_` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZEPHYR_").split("__"));

    Ok(figment.extract()?)
}

/// Load config for read-only use, returning a default on failure.
///
/// A broken file is reported but never fatal here; commands that write the
/// config back must use [`load_config_from`] instead.
pub fn load_config_or_default() -> Config {
    let path = config_path();
    load_config_from(&path).unwrap_or_else(|err| {
        if path.exists() {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config file");
        } else {
            debug!(error = %err, "falling back to default config");
        }
        Config::default()
    })
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, CliError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(cfg)?)?;
    Ok(path)
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything needed to talk to the cloud for one invocation.
#[derive(Debug)]
pub struct Session {
    pub profile: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub base_url: Option<Url>,
    pub timeout: Duration,
    pub speeds: SpeedTable,
}

/// Merge global flags over the active profile.
///
/// An explicitly requested profile must exist; the implicit default may be
/// missing, in which case flags and env vars alone are used.
pub fn resolve_session(global: &GlobalOpts, config: &Config) -> Result<Session, CliError> {
    let name = active_profile_name(global, config);
    let empty = Profile::default();
    let profile = match config.profiles.get(&name) {
        Some(p) => p,
        None if global.profile.is_some() => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => &empty,
    };

    // Base URL (flag > env > profile)
    let base_url = global
        .base_url
        .as_deref()
        .or(profile.base_url.as_deref())
        .map(|raw| {
            Url::parse(raw).map_err(|e| CliError::Validation {
                field: "base-url".into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })
        })
        .transpose()?;

    let username = global.username.clone().or_else(|| profile.username.clone());
    let password = resolve_password(profile, &name, global);
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(config.defaults.timeout);

    Ok(Session {
        profile: name,
        username,
        password,
        base_url,
        timeout: Duration::from_secs(timeout),
        speeds: profile.speeds.unwrap_or_default(),
    })
}

impl Session {
    /// Build a client for this session. The token, if any, is applied by
    /// the caller.
    pub fn client(&self) -> Result<ZephyrClient, CliError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        let mut client = ZephyrClient::from_transport(&transport)
            .map_err(|e| CliError::from_api(e, &self.profile))?
            .with_speeds(self.speeds);

        if let Some(ref url) = self.base_url {
            client = client.with_base_url(url.clone());
        }
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            client = client.with_credentials(user.clone(), pass.clone());
        }
        Ok(client)
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

// ── Credential helpers ───────────────────────────────────────────────

/// Resolve a password: flag/env > profile's `password_env` > keyring > plaintext.
fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Option<SecretString> {
    if let Some(ref pw) = global.password {
        return Some(SecretString::from(pw.clone()));
    }

    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Some(pw) = keyring_get(profile_name, "password") {
        return Some(SecretString::from(pw));
    }

    profile.password.clone().map(SecretString::from)
}

fn keyring_entry(profile_name: &str, kind: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
}

/// Read a secret from the system keyring, treating any failure as absent.
pub fn keyring_get(profile_name: &str, kind: &str) -> Option<String> {
    match keyring_entry(profile_name, kind).and_then(|entry| entry.get_password()) {
        Ok(secret) => Some(secret),
        Err(err) => {
            debug!(profile_name, kind, error = %err, "no keyring entry");
            None
        }
    }
}

/// Store a secret in the system keyring.
pub fn keyring_set(profile_name: &str, kind: &str, secret: &str) -> Result<(), CliError> {
    keyring_entry(profile_name, kind)?.set_password(secret)?;
    Ok(())
}
