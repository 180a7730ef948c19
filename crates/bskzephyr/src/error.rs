//! CLI error types with miette diagnostics.
//!
//! Maps `bskzephyr_api::Error` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Zephyr cloud")]
    #[diagnostic(
        code(zephyr::connection_failed),
        help("Check your network connection, or --base-url if you set one.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(zephyr::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed{}", detail(.message.as_deref()))]
    #[diagnostic(
        code(zephyr::auth_failed),
        help(
            "Verify your email and password, then sign in again.\n\
             Run: zephyr config set-password --profile {profile}"
        )
    )]
    AuthFailed {
        profile: String,
        message: Option<String>,
    },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(zephyr::no_credentials),
        help(
            "Configure credentials with: zephyr config init\n\
             Or set ZEPHYR_USERNAME and ZEPHYR_PASSWORD (or ZEPHYR_TOKEN)."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Zephyr API error (HTTP {status})")]
    #[diagnostic(code(zephyr::api_error))]
    ApiError { status: u16 },

    #[error("Unexpected response from the Zephyr cloud: {message}")]
    #[diagnostic(
        code(zephyr::invalid_response),
        help("Run again with -vv to see the request log.")
    )]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zephyr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zephyr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: zephyr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(zephyr::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(zephyr::keyring),
        help("Is a secret service running? Set ZEPHYR_PASSWORD / ZEPHYR_TOKEN instead.")
    )]
    Keyring(#[from] keyring::Error),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(zephyr::config_write))]
    ConfigWrite(#[from] toml::ser::Error),
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to an API error.
    pub fn from_api(err: bskzephyr_api::Error, profile: &str) -> Self {
        use bskzephyr_api::Error as ZephyrError;

        match err {
            ZephyrError::InvalidAuth { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            ZephyrError::Api { status, .. } => Self::ApiError {
                status: status.as_u16(),
            },
            ZephyrError::Transport(e) if e.is_timeout() => Self::Timeout,
            ZephyrError::Transport(e) => Self::ConnectionFailed { source: e.into() },
            ZephyrError::InvalidUrl(e) => Self::Validation {
                field: "base-url".into(),
                reason: e.to_string(),
            },
            ZephyrError::Deserialization { message, .. } => Self::InvalidResponse { message },
            dup @ ZephyrError::DuplicateSpeedCode { .. } => Self::Validation {
                field: "speeds".into(),
                reason: dup.to_string(),
            },
        }
    }
}
