use reqwest::StatusCode;
use thiserror::Error;

use crate::models::FanSpeed;

/// Top-level error type for the `bskzephyr-api` crate.
///
/// The two API-facing kinds are [`InvalidAuth`](Self::InvalidAuth) and
/// [`Api`](Self::Api). Malformed payloads surface separately as
/// [`Deserialization`](Self::Deserialization) so callers can tell a
/// rejected request from a response they could not read.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected, token missing, or an authenticated call
    /// came back unauthorized.
    #[error("Invalid authentication{}", auth_suffix(.message.as_deref()))]
    InvalidAuth {
        message: Option<String>,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ── API ─────────────────────────────────────────────────────────
    /// Any other non-success response from the Zephyr cloud.
    #[error("Zephyr API error (HTTP {status})")]
    Api {
        status: StatusCode,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Two presets were given the same raw speed code.
    #[error("Speed code {code} is assigned to both {first} and {second}")]
    DuplicateSpeedCode {
        code: u16,
        first: FanSpeed,
        second: FanSpeed,
    },
}

fn auth_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl Error {
    pub(crate) fn invalid_auth(message: impl Into<String>) -> Self {
        Self::InvalidAuth {
            message: Some(message.into()),
            source: None,
        }
    }

    pub(crate) fn api_status(status: StatusCode) -> Self {
        Self::Api {
            status,
            source: None,
        }
    }

    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::InvalidAuth { .. })
    }

    /// The HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::InvalidAuth {
                source: Some(err), ..
            }
            | Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}
